//! Ownership of the single running engine instance.
//!
//! Every cartridge swap runs the same sequence: save the outgoing instance, drop it, load the save data of the
//! incoming cartridge, and construct the new instance. Nothing else ever replaces the instance.
use crate::cartridge::CartridgeHeader;
use crate::engine::Engine;
use crate::persistence::store::{SaveStore, StorageError};
use crate::persistence::PersistenceManager;

#[derive(Debug, thiserror::Error)]
pub enum SessionError<E: std::error::Error + 'static> {
    #[error("the engine rejected cartridge `{identity}`")]
    InvalidCartridge {
        identity: String,
        #[source]
        source: E,
    },
}

/// An engine instance together with the identity its saves are keyed by.
pub struct ActiveCartridge<E> {
    identity: String,
    header: Option<CartridgeHeader>,
    engine: E,
}

impl<E> ActiveCartridge<E> {
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// The parsed header, `None` if the ROM was too short to have one.
    pub fn header(&self) -> Option<&CartridgeHeader> {
        self.header.as_ref()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }
}

pub struct Session<E, S> {
    current: Option<ActiveCartridge<E>>,
    persistence: PersistenceManager<S>,
}

impl<E: Engine, S: SaveStore> Session<E, S> {
    pub fn new(persistence: PersistenceManager<S>) -> Self {
        Self {
            current: None,
            persistence,
        }
    }

    pub fn is_running(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&ActiveCartridge<E>> {
        self.current.as_ref()
    }

    pub fn identity(&self) -> Option<&str> {
        self.current.as_ref().map(|c| c.identity.as_str())
    }

    pub fn engine(&self) -> Option<&E> {
        self.current.as_ref().map(|c| &c.engine)
    }

    pub fn engine_mut(&mut self) -> Option<&mut E> {
        self.current.as_mut().map(|c| &mut c.engine)
    }

    pub fn persistence(&self) -> &PersistenceManager<S> {
        &self.persistence
    }

    /// Replace the running cartridge with `rom`, keyed by `identity`.
    ///
    /// The outgoing instance is saved and dropped first, even if the new cartridge turns out to be invalid.
    /// A failure to save the outgoing instance is logged but does not stop the load.
    pub fn load_cartridge(&mut self, identity: impl Into<String>, rom: &[u8]) -> Result<(), SessionError<E::Error>> {
        let identity = identity.into();

        if let Err(e) = self.eject() {
            log::warn!("Continuing cartridge load after failed save: {}", e);
        }

        let header = match CartridgeHeader::new(rom) {
            Ok(header) => {
                if !header.checksum_valid() {
                    log::warn!(
                        "Header checksum mismatch! Calculated: {}, Read: {}, continuing Cartridge load...",
                        header.calculated_checksum,
                        header.header_checksum
                    );
                }
                Some(header)
            }
            Err(e) => {
                log::warn!("{}", e);
                None
            }
        };

        let saves = self.persistence.load(&identity);
        let engine = E::new(rom, &saves.ram, &saves.rtc).map_err(|source| SessionError::InvalidCartridge {
            identity: identity.clone(),
            source,
        })?;

        match &header {
            Some(header) => log::info!(
                "Loaded `{}`: {} (type {:#04X}, {} bytes RAM, {} bytes RTC restored)",
                identity,
                header.title,
                header.cart_type,
                saves.ram.len(),
                saves.rtc.len()
            ),
            None => log::info!(
                "Loaded `{}` ({} bytes RAM, {} bytes RTC restored)",
                identity,
                saves.ram.len(),
                saves.rtc.len()
            ),
        }
        log::debug!("Cartridge header: {:#?}", header);

        self.current = Some(ActiveCartridge {
            identity,
            header,
            engine,
        });

        Ok(())
    }

    /// Save the running instance's battery state and drop the instance.
    ///
    /// The instance is dropped even when saving fails; the error is returned so it can be shown to the user.
    pub fn eject(&mut self) -> Result<(), StorageError> {
        let result = self.persist();

        if let Some(old) = self.current.take() {
            log::info!("Ejected `{}`", old.identity);
        }

        result
    }

    /// Save the running instance's battery state, leaving it running.
    pub fn persist(&mut self) -> Result<(), StorageError> {
        match &self.current {
            Some(active) => {
                let ram = active.engine.dump_ram();
                let rtc = active.engine.dump_rtc();

                self.persistence.save(&active.identity, &ram, &rtc)
            }
            None => Ok(()),
        }
    }
}
