//! Domain types for geocache.
//!
//! - [`Coordinate`]: Validated latitude/longitude pair
//! - [`AddressComponent`]: One tagged part of an address
//! - [`Place`]: The result of every lookup
//! - [`Locale`]: Normalized language tag for localized results

mod address;
mod coordinate;
mod locale;
mod place;

pub use address::*;
pub use coordinate::*;
pub use locale::*;
pub use place::*;
