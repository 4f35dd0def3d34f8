pub mod census;
pub mod parcel;
pub mod post;
