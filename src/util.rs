pub(crate) mod date_only;
pub(crate) mod duration_millis;
