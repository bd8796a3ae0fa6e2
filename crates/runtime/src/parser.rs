//! Tools for loading systems and workload lists from YAML files.

use std::path::Path;

use serde::de::DeserializeOwned;

use crate::{
    error::{Error, Result},
    system::SystemConfig,
    workload::WorkloadSpec,
};

fn read_yaml<T: DeserializeOwned, P: AsRef<Path>>(file: P) -> Result<T> {
    let path = file.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&content).map_err(|source| Error::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

impl SystemConfig {
    /// Read [SystemConfig] from YAML file and validate it.
    pub fn from_yaml<P: AsRef<Path>>(file: P) -> Result<Self> {
        let config: SystemConfig = read_yaml(file)?;
        config.validate()?;
        Ok(config)
    }
}

/// Read a list of [WorkloadSpec] from YAML file and validate every record.
pub fn workloads_from_yaml<P: AsRef<Path>>(file: P) -> Result<Vec<WorkloadSpec>> {
    let specs: Vec<WorkloadSpec> = read_yaml(file)?;
    for spec in specs.iter() {
        spec.validate()?;
    }
    Ok(specs)
}
