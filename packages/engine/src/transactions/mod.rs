//! Transaction extraction strategies.
//!
//! * [`generic`]: one transaction per `date description amount` line
//! * [`icici`]: a bounded section with dates optionally wrapped over two
//!   lines
//! * [`visa`]: ruled tables on pages that announce transaction details,
//!   with a line-pattern fallback

pub mod generic;
pub mod icici;
pub mod visa;
