#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use samo_linalg as linalg;

#[doc(inline)]
pub use samo_align as align;

#[doc(inline)]
pub use samo_io as io;
