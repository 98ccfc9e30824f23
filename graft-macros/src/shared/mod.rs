pub mod inflect_attr;
