//! Fake Environment
//!
//! テスト用の状態を持つ偽の実行環境。One [`FakeEnv`] plays the unit, the
//! relation store, the workload container and the cluster, and records every
//! mutating call.
#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

use ran_cu_operator::config::{ConfigValue, RawConfig, Settings};
use ran_cu_operator::operator::{
    AttachmentPlan, Context, NetworkAttachments, PrivilegeGrant, UnitModel, UnitStatus,
};
use ran_cu_operator::relations::{DataBag, RelationId, RelationStore};
use ran_cu_operator::workload::{Layer, Workload};
use ran_cu_operator::{OperatorError, Result};

pub const CONFIG_PATH: &str = "/tmp/conf/cu.conf";

/// Mutating call observed by the fake
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ConfigureAttachments,
    Push(String),
    AddLayer(String),
    Replan,
    Restart(String),
    Grant(String),
    Exec(Vec<String>),
    Publish(RelationId, DataBag),
}

/// Environment state
#[derive(Debug, Default)]
pub struct World {
    pub leader: bool,
    pub model: String,
    pub app: String,
    pub address: Option<String>,
    pub config: RawConfig,
    pub relations: BTreeMap<String, Vec<RelationId>>,
    pub remote_data: BTreeMap<RelationId, DataBag>,
    pub local_data: BTreeMap<RelationId, DataBag>,
    pub reachable: bool,
    pub dirs: BTreeSet<String>,
    pub files: BTreeMap<String, String>,
    pub plan: Layer,
    pub route_table: String,
    pub privileged: bool,
    pub fail_grant: bool,
    pub multus_available: bool,
    pub attachments: Option<AttachmentPlan>,
    pub status: Option<UnitStatus>,
    pub workload_version: Option<String>,
    pub calls: Vec<Call>,
}

#[derive(Debug, Default)]
pub struct FakeEnv {
    world: Mutex<World>,
}

impl FakeEnv {
    /// Leader with an N2 relation whose AMF published everything, storage
    /// attached and the container reachable
    pub fn ready() -> Arc<Self> {
        let env = Arc::new(Self::default());
        {
            let mut world = env.world();
            world.leader = true;
            world.model = "whatever".to_string();
            world.app = "oai-ran-cu-k8s".to_string();
            world.address = Some("1.1.1.1".to_string());
            world.reachable = true;
            world.dirs.insert("/tmp/conf".to_string());
            world.privileged = true;
            world.multus_available = true;
        }
        env.relate(
            "fiveg_n2",
            1,
            &[
                ("amf_hostname", "amf.whatever.svc.cluster.local"),
                ("amf_ip_address", "1.2.3.4"),
                ("amf_port", "38412"),
            ],
        );
        env
    }

    pub fn world(&self) -> MutexGuard<'_, World> {
        self.world.lock().unwrap()
    }

    /// Establish a relation with remote application data
    pub fn relate(&self, endpoint: &str, id: u32, data: &[(&str, &str)]) -> RelationId {
        let relation = RelationId::new(endpoint, id);
        let mut world = self.world();
        world
            .relations
            .entry(endpoint.to_string())
            .or_default()
            .push(relation.clone());
        world.remote_data.insert(
            relation.clone(),
            data.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        relation
    }

    pub fn set_config(&self, key: &str, value: ConfigValue) {
        self.world().config.insert(key.to_string(), value);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.world().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.world().calls.clear();
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.world().calls.iter().filter(|&call| predicate(call)).count()
    }

    pub fn file(&self, path: &str) -> Option<String> {
        self.world().files.get(path).cloned()
    }

    pub fn status(&self) -> Option<UnitStatus> {
        self.world().status.clone()
    }

    fn record(&self, call: Call) {
        self.world().calls.push(call);
    }
}

/// Context whose collaborators all point at `env`
pub fn context(env: &Arc<FakeEnv>) -> Context {
    Context::new(
        env.clone(),
        env.clone(),
        env.clone(),
        env.clone(),
        env.clone(),
        Settings::default(),
    )
}

pub fn is_push(call: &Call) -> bool {
    matches!(call, Call::Push(_))
}

pub fn is_restart(call: &Call) -> bool {
    matches!(call, Call::Restart(_))
}

pub fn is_publish(call: &Call) -> bool {
    matches!(call, Call::Publish(..))
}

impl UnitModel for FakeEnv {
    fn is_leader(&self) -> Result<bool> {
        Ok(self.world().leader)
    }

    fn private_address(&self) -> Result<Option<String>> {
        Ok(self.world().address.clone())
    }

    fn charm_config(&self) -> Result<RawConfig> {
        Ok(self.world().config.clone())
    }

    fn model_name(&self) -> Result<String> {
        Ok(self.world().model.clone())
    }

    fn app_name(&self) -> Result<String> {
        Ok(self.world().app.clone())
    }

    fn set_status(&self, status: &UnitStatus) -> Result<()> {
        self.world().status = Some(status.clone());
        Ok(())
    }

    fn set_workload_version(&self, version: &str) -> Result<()> {
        self.world().workload_version = Some(version.to_string());
        Ok(())
    }
}

impl RelationStore for FakeEnv {
    fn relation_ids(&self, endpoint: &str) -> Result<Vec<RelationId>> {
        Ok(self
            .world()
            .relations
            .get(endpoint)
            .cloned()
            .unwrap_or_default())
    }

    fn remote_app_data(&self, relation: &RelationId) -> Result<DataBag> {
        Ok(self
            .world()
            .remote_data
            .get(relation)
            .cloned()
            .unwrap_or_default())
    }

    fn update_local_app_data(&self, relation: &RelationId, data: &DataBag) -> Result<()> {
        let mut world = self.world();
        world
            .local_data
            .entry(relation.clone())
            .or_default()
            .extend(data.clone());
        world.calls.push(Call::Publish(relation.clone(), data.clone()));
        Ok(())
    }
}

impl Workload for FakeEnv {
    fn can_connect(&self) -> bool {
        self.world().reachable
    }

    fn exists(&self, path: &str) -> Result<bool> {
        let world = self.world();
        Ok(world.dirs.contains(path) || world.files.contains_key(path))
    }

    fn pull(&self, path: &str) -> Result<Option<String>> {
        Ok(self.world().files.get(path).cloned())
    }

    fn push(&self, path: &str, content: &str) -> Result<()> {
        let mut world = self.world();
        world.files.insert(path.to_string(), content.to_string());
        world.calls.push(Call::Push(path.to_string()));
        Ok(())
    }

    fn exec(&self, command: &[String]) -> Result<String> {
        let mut world = self.world();
        let args: Vec<&str> = command.iter().map(String::as_str).collect();
        match args.as_slice() {
            ["ip", "route", "show"] => Ok(world.route_table.clone()),
            ["ip", "route", "replace", destination, "via", gateway] => {
                // `ip route show` prints host routes without the prefix length
                let shown = destination.strip_suffix("/32").unwrap_or(destination);
                let line = format!("{} via {} dev n3\n", shown, gateway);
                world.route_table.push_str(&line);
                world.calls.push(Call::Exec(command.to_vec()));
                Ok(String::new())
            }
            _ => Err(OperatorError::Workload(format!("unexpected command: {:?}", command))),
        }
    }

    fn plan(&self) -> Result<Layer> {
        Ok(self.world().plan.clone())
    }

    fn add_layer(&self, label: &str, layer: &Layer) -> Result<()> {
        let mut world = self.world();
        world.plan.services.extend(layer.services.clone());
        world.calls.push(Call::AddLayer(label.to_string()));
        Ok(())
    }

    fn replan(&self) -> Result<()> {
        self.record(Call::Replan);
        Ok(())
    }

    fn restart(&self, service: &str) -> Result<()> {
        self.record(Call::Restart(service.to_string()));
        Ok(())
    }
}

impl PrivilegeGrant for FakeEnv {
    fn is_privileged(&self, _container: &str) -> Result<bool> {
        Ok(self.world().privileged)
    }

    fn grant(&self, container: &str) -> Result<()> {
        let mut world = self.world();
        if world.fail_grant {
            return Err(OperatorError::Workload("statefulset not found".to_string()));
        }
        world.privileged = true;
        world.calls.push(Call::Grant(container.to_string()));
        Ok(())
    }
}

impl NetworkAttachments for FakeEnv {
    fn is_available(&self) -> Result<bool> {
        Ok(self.world().multus_available)
    }

    fn is_ready(&self, desired: &AttachmentPlan) -> Result<bool> {
        Ok(self.world().attachments.as_ref() == Some(desired))
    }

    fn configure(&self, desired: &AttachmentPlan) -> Result<()> {
        let mut world = self.world();
        world.attachments = Some(desired.clone());
        world.calls.push(Call::ConfigureAttachments);
        Ok(())
    }
}
