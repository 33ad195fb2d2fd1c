//! Contains tile coordinates, bounding boxes, the tile enumeration and storage keys.

mod geo_bbox;
pub use geo_bbox::*;

mod storage_key;
pub use storage_key::*;

mod tile_bbox;
pub use tile_bbox::*;

mod tile_coord;
pub use tile_coord::*;

mod tile_enumeration;
pub use tile_enumeration::*;
