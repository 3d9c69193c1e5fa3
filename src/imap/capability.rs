use enumflags2::{BitFlags, bitflags};
use log::trace;

#[bitflags]
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Capability {
    Imap4rev1,
    LiteralPlus,
    LoginDisabled,
}

/// Server capabilities relevant for logging in and uploading mail.
#[derive(Debug, Default, Clone, Copy)]
pub struct Capabilities {
    capabilities: BitFlags<Capability>,
}

impl Capabilities {
    pub fn from_response(caps: &[imap_proto::Capability]) -> Self {
        let mut capabilities = Self::default();
        for cap in caps {
            capabilities.insert(cap);
        }
        trace!("capabilities = {capabilities:?}");
        capabilities
    }

    pub fn insert(&mut self, capability: &imap_proto::Capability) {
        match capability {
            imap_proto::Capability::Imap4rev1 => {
                self.capabilities.insert(Capability::Imap4rev1);
            }
            imap_proto::Capability::Atom(cow) => match cow.as_ref() {
                "LITERAL+" => {
                    self.capabilities.insert(Capability::LiteralPlus);
                }
                "LOGINDISABLED" => {
                    self.capabilities.insert(Capability::LoginDisabled);
                }
                _ => {
                    trace!("ignoring capability {cow}");
                }
            },
            imap_proto::Capability::Auth(cow) => {
                trace!("ignoring auth mechanism {cow}");
            }
        }
    }

    pub fn contains(&self, other: Capability) -> bool {
        self.capabilities.contains(other)
    }
}
