//! EC2 instances, their volumes and addresses

use std::collections::HashSet;
use std::sync::Arc;

use drift_resource::{Attributes, Resource, ResourceFactory};
use serde_json::{Map, Value};
use tracing::debug;

use super::types;
use crate::error::Result;
use crate::middleware::Middleware;

const BLOCK_DEVICES: [&str; 2] = ["root_block_device", "ebs_block_device"];

/// Turns the `root_block_device` and `ebs_block_device` blocks of state
/// instances into `aws_ebs_volume` resources.
///
/// Remote instances lose the same blocks since their volumes are
/// enumerated on their own.
pub struct AwsInstanceBlockDeviceResourceMapper {
    factory: Arc<dyn ResourceFactory>,
}

impl AwsInstanceBlockDeviceResourceMapper {
    pub fn new(factory: Arc<dyn ResourceFactory>) -> Self {
        Self { factory }
    }

    fn volumes(&self, instance: &Resource, known: &mut HashSet<String>) -> Vec<Resource> {
        let mut volumes = Vec::new();
        for key in BLOCK_DEVICES {
            let Some(devices) = instance.attrs.get_slice(key) else {
                continue;
            };
            for device in devices.iter().filter_map(Value::as_object) {
                let Some(volume_id) = device.get("volume_id").and_then(Value::as_str) else {
                    debug!(instance = %instance.id, block = key, "Block device without volume id, skipping");
                    continue;
                };
                if !known.insert(volume_id.to_string()) {
                    debug!(volume = volume_id, instance = %instance.id, "Volume already declared, skipping");
                    continue;
                }
                debug!(volume = volume_id, instance = %instance.id, block = key, "Creating aws_ebs_volume from block device");
                volumes.push(self.factory.create_abstract_resource(
                    types::EBS_VOLUME,
                    volume_id,
                    volume_data(instance, device, volume_id),
                ));
            }
        }
        volumes
    }
}

fn volume_data(instance: &Resource, device: &Map<String, Value>, volume_id: &str) -> Attributes {
    let field = |key: &str| device.get(key).cloned().unwrap_or(Value::Null);
    let tags = instance
        .attrs
        .get("volume_tags")
        .cloned()
        .unwrap_or_else(|| field("tags"));

    let mut data = Attributes::new();
    data.insert(
        "availability_zone",
        instance.attrs.get("availability_zone").cloned().unwrap_or(Value::Null),
    );
    data.insert("encrypted", field("encrypted"));
    data.insert("id", volume_id);
    data.insert("iops", field("iops"));
    data.insert("kms_key_id", field("kms_key_id"));
    data.insert("size", field("volume_size"));
    data.insert("type", field("volume_type"));
    data.insert("multi_attach_enabled", false);
    data.insert("tags", tags);
    if let Some(throughput) = device.get("throughput") {
        data.insert("throughput", throughput.clone());
    }
    data
}

fn strip_devices(instance: &mut Resource) {
    let removed = BLOCK_DEVICES
        .iter()
        .filter_map(|key| instance.attrs.remove(key))
        .count();
    if removed > 0 {
        instance.attrs.remove("volume_tags");
    }
}

impl Middleware for AwsInstanceBlockDeviceResourceMapper {
    fn name(&self) -> &'static str {
        "aws_instance_block_device_resource_mapper"
    }

    fn execute(&self, remote: &mut Vec<Resource>, state: &mut Vec<Resource>) -> Result<()> {
        let mut known: HashSet<String> = state
            .iter()
            .filter(|r| r.is(types::EBS_VOLUME))
            .map(|r| r.id.clone())
            .collect();

        let mut out = Vec::with_capacity(state.len());
        for mut res in std::mem::take(state) {
            if res.is(types::INSTANCE) {
                out.extend(self.volumes(&res, &mut known));
                strip_devices(&mut res);
            }
            out.push(res);
        }
        *state = out;

        for instance in remote.iter_mut().filter(|r| r.is(types::INSTANCE)) {
            for key in BLOCK_DEVICES {
                instance.attrs.remove(key);
            }
            instance.attrs.remove("volume_tags");
        }
        Ok(())
    }
}

/// Clears `public_ip` and `public_dns` of instances that state binds to an
/// elastic IP, since the address then belongs to the EIP.
#[derive(Debug, Default, Clone, Copy)]
pub struct AwsInstanceEip;

impl Middleware for AwsInstanceEip {
    fn name(&self) -> &'static str {
        "aws_instance_eip"
    }

    fn execute(&self, remote: &mut Vec<Resource>, state: &mut Vec<Resource>) -> Result<()> {
        let bound: HashSet<String> = state
            .iter()
            .filter_map(|r| match r.resource_type() {
                types::EIP => r.attrs.get_non_empty_str("instance"),
                types::EIP_ASSOCIATION => r.attrs.get_non_empty_str("instance_id"),
                _ => None,
            })
            .map(str::to_string)
            .collect();
        if bound.is_empty() {
            return Ok(());
        }

        for instance in remote
            .iter_mut()
            .chain(state.iter_mut())
            .filter(|r| r.is(types::INSTANCE) && bound.contains(&r.id))
        {
            debug!(id = %instance.id, "Clearing public address of instance bound to an EIP");
            instance.attrs.remove("public_ip");
            instance.attrs.remove("public_dns");
        }
        Ok(())
    }
}

/// Drops EIP associations whose allocation belongs to a NAT gateway.
///
/// NAT gateways take their address at creation; such associations cannot
/// be declared and would otherwise always show as unmanaged.
#[derive(Debug, Default, Clone, Copy)]
pub struct AwsNatGatewayEipAssoc;

fn nat_allocations(remote: &[Resource]) -> HashSet<&str> {
    remote
        .iter()
        .filter(|r| r.is(types::NAT_GATEWAY))
        .filter_map(|r| r.attrs.get_str("allocation_id"))
        .collect()
}

impl Middleware for AwsNatGatewayEipAssoc {
    fn name(&self) -> &'static str {
        "aws_nat_gateway_eip_assoc"
    }

    fn execute(&self, remote: &mut Vec<Resource>, state: &mut Vec<Resource>) -> Result<()> {
        let owned: HashSet<String> = nat_allocations(remote)
            .into_iter()
            .map(str::to_string)
            .collect();

        let owned_by_gateway = |r: &Resource| {
            r.is(types::EIP_ASSOCIATION)
                && r.attrs
                    .get_str("allocation_id")
                    .is_some_and(|id| owned.contains(id))
        };

        for collection in [&mut *remote, &mut *state] {
            collection.retain(|r| {
                let drop = owned_by_gateway(r);
                if drop {
                    debug!(id = %r.id, "Ignoring EIP association owned by a NAT gateway");
                }
                !drop
            });
        }
        Ok(())
    }
}
