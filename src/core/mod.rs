/*!
 * Core
 * Errors, limits and the monitor building block
 */

pub mod errors;
pub mod limits;
pub mod sync;
