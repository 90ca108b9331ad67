pub mod daf_header;
pub mod directory;
pub mod ephemeris_record;
pub mod naif_ids;
pub mod spk_kernel;
pub mod summary_record;
