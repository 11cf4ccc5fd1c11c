pub mod geom;
pub mod layout;
pub mod param;
pub mod version;

pub use geom::*;
pub use layout::*;
pub use param::*;
pub use version::*;
