mod thumbnail;

pub use thumbnail::*;
