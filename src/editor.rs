//! Editor session: a connector plus the persisted device choice.

use crate::config::{ConfigStore, EditorConfig};
use crate::error::Result;
use crate::sequence_file;
use microdude_midi_io::Backend;
use microdude_protocol::{Connector, ConnectorConfig, Parameter, WriteMode};
use std::path::Path;
use tracing::{info, warn};

/// # Example
///
/// ```ignore
/// use microdude::prelude::*;
///
/// let mut editor = Editor::builder(MidirBackend::new())
///     .config_store(ConfigStore::in_home()?)
///     .build();
///
/// if editor.connect()? {
///     for (parameter, value) in editor.load_status()? {
///         println!("{}: {}", parameter, value);
///     }
/// }
/// ```
pub struct EditorBuilder<B: Backend> {
    backend: B,
    store: Option<ConfigStore>,
    connector: ConnectorConfig,
}

impl<B: Backend> EditorBuilder<B> {
    /// Without a store the configuration lives only in memory.
    pub fn config_store(mut self, store: ConfigStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn connector_config(mut self, config: ConnectorConfig) -> Self {
        self.connector = config;
        self
    }

    pub fn build(self) -> Editor<B> {
        let config = match &self.store {
            Some(store) => {
                if let Err(e) = store.ensure_exists() {
                    warn!("Config file could not be created: {}", e);
                }
                store.load()
            }
            None => EditorConfig::default(),
        };
        Editor {
            connector: Connector::with_config(self.backend, self.connector),
            store: self.store,
            config,
        }
    }
}

pub struct Editor<B: Backend> {
    connector: Connector<B>,
    store: Option<ConfigStore>,
    config: EditorConfig,
}

impl<B: Backend> Editor<B> {
    pub fn builder(backend: B) -> EditorBuilder<B> {
        EditorBuilder {
            backend,
            store: None,
            connector: ConnectorConfig::default(),
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn connector(&self) -> &Connector<B> {
        &self.connector
    }

    pub fn connector_mut(&mut self) -> &mut Connector<B> {
        &mut self.connector
    }

    pub fn is_connected(&self) -> bool {
        self.connector.is_connected()
    }

    /// Names of the MIDI devices the backend can open.
    pub fn list_devices(&self) -> Result<Vec<String>> {
        Ok(self.connector.backend().list_devices()?)
    }

    /// Connect to the configured device. Returns whether a MicroBrute answered.
    pub fn connect(&mut self) -> Result<bool> {
        if !self.config.has_device() {
            warn!("No MIDI device configured");
            return Ok(false);
        }
        let device = self.config.device.clone();
        self.connector.connect(&device)?;
        self.report_status();
        Ok(self.connector.is_connected())
    }

    /// Connect unless already connected.
    pub fn reconnect(&mut self) -> Result<bool> {
        if self.connector.is_connected() {
            return Ok(true);
        }
        self.connect()
    }

    /// Connect to `device` and remember it when the handshake succeeds.
    pub fn select_device(&mut self, device: &str) -> Result<bool> {
        self.connector.connect(device)?;
        self.report_status();
        if !self.connector.is_connected() {
            return Ok(false);
        }

        if self.config.device != device {
            self.config.device = device.to_string();
            if let Some(store) = &self.store {
                store.save(&self.config)?;
            }
        }
        Ok(true)
    }

    /// Every parameter value currently set on the device.
    pub fn load_status(&mut self) -> Result<Vec<(Parameter, u8)>> {
        Ok(self.connector.read_all_parameters()?)
    }

    /// Live edit from the panel: CC write, nothing stored on the device.
    pub fn set_parameter(&mut self, parameter: Parameter, value: u8) -> Result<()> {
        Ok(self
            .connector
            .set_parameter(parameter, value, WriteMode::Transient)?)
    }

    pub fn download_sequences(&mut self, path: &Path) -> Result<()> {
        sequence_file::download_sequences(&mut self.connector, path)
    }

    pub fn upload_sequences(&mut self, path: &Path) -> Result<usize> {
        sequence_file::upload_sequences(&mut self.connector, path)
    }

    pub fn disconnect(&mut self) {
        self.connector.disconnect();
    }

    fn report_status(&self) {
        if self.connector.is_connected() {
            info!("Connected");
        } else {
            info!("Not connected");
        }
    }
}
