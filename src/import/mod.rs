mod csv_import;
mod export;

pub(crate) use csv_import::import_file;
pub(crate) use export::export_to_path;
