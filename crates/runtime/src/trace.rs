use std::{fs::File, io::Write, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    system::HostConfig,
    workload::WorkloadId,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TraceEvent {
    WorkloadExpired {
        time: f64,
        vm_id: WorkloadId,
        host: String,
    },
    WorkloadMigrated {
        time: f64,
        vm_id: WorkloadId,
        from: String,
        to: String,
    },
    TickCompleted {
        time: f64,
        power: f64,
        active_vms: usize,
    },
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Trace {
    pub hosts: Vec<HostConfig>,
    pub events: Vec<TraceEvent>,
}

impl Trace {
    pub fn new(hosts: Vec<HostConfig>) -> Self {
        Self {
            hosts,
            events: Vec::new(),
        }
    }

    pub fn log(&mut self, event: TraceEvent) {
        self.events.push(event);
    }

    pub fn save<P: AsRef<Path>>(&self, file: P) -> Result<()> {
        let path = file.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        File::create(path)
            .and_then(|mut file| file.write_all(json.as_bytes()))
            .map_err(|source| Error::Io {
                path: path.to_path_buf(),
                source,
            })
    }
}
