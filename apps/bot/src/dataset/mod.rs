pub mod parcels;
pub mod side_table;
