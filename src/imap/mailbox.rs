use derive_builder::Builder;
use derive_getters::Getters;

/// State of a mailbox as reported by the server when selecting it.
#[derive(Debug, Getters, Builder, Clone, PartialEq, Eq)]
pub struct Mailbox {
    #[builder(setter(into))]
    name: String,
    #[builder(default)]
    #[getter(copy)]
    readonly: bool,
    #[builder(default)]
    flags: Vec<String>,
    #[getter(copy)]
    exists: u32,
    #[builder(default)]
    #[getter(copy)]
    recent: u32,
    #[builder(setter(strip_option), default)]
    #[getter(copy)]
    uid_validity: Option<u32>,
}
