pub mod note_catalog;
pub mod subject_catalog;
