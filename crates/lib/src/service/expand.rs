use tracing::{debug, trace};

use super::{ServiceEntity, ServiceLayout};
use crate::manifest::{ArgsSpec, Manifest, ServiceDefinition, ValueMap, merge_layers};
use crate::placeholder::substitute_map;

/// Turn a manifest into service entities, one per process instance.
///
/// Global env/args are merged under each service's own, instances are named
/// `<name>`, `<name>-1`, `<name>-2`, ... and `%i` is substituted with the
/// instance index. When `filter` is set only the entity with exactly that
/// name is kept, unless the layout serves a single global package.
pub fn expand(manifest: &Manifest, filter: Option<&str>, layout: &ServiceLayout) -> Vec<ServiceEntity> {
  let global_env = manifest.env.as_ref();
  let global_args = manifest.args.as_ref().map(ArgsSpec::to_map);

  let mut entities = Vec::new();
  for (name, definition) in &manifest.services {
    let env = merge_layers(global_env, definition.env.as_ref());
    let local_args = definition.args.as_ref().map(ArgsSpec::to_map);
    let args = merge_layers(global_args.as_ref(), local_args.as_ref());

    for index in 0..instance_count(definition) {
      let entity_name = if index == 0 { name.clone() } else { format!("{name}-{index}") };

      if !layout.global_package && filter.is_some_and(|f| f != entity_name) {
        trace!(service = %entity_name, "filtered out");
        continue;
      }

      entities.push(build_entity(
        entity_name,
        name,
        definition,
        substitute_map(&env, index),
        substitute_map(&args, index),
        index,
        layout,
      ));
    }
  }

  debug!(count = entities.len(), filter = ?filter, "expanded services");
  entities
}

fn instance_count(definition: &ServiceDefinition) -> u32 {
  definition.processes.unwrap_or(1).max(1)
}

fn build_entity(
  name: String,
  declared_name: &str,
  definition: &ServiceDefinition,
  env: ValueMap,
  args: ValueMap,
  index: u32,
  layout: &ServiceLayout,
) -> ServiceEntity {
  let module = definition.module.clone().unwrap_or_else(|| declared_name.to_string());
  let log_file = layout.logs_directory.join(format!("{name}.log"));
  let script_path = layout
    .daemons_directory
    .join(format!("{name}{}", layout.daemon_extension));

  ServiceEntity {
    description: definition.description.clone().unwrap_or_default(),
    working_directory: layout.working_directory(&module),
    module,
    process_index: index,
    scripts: definition.scripts.clone().unwrap_or_default(),
    env,
    args,
    log_file,
    script_path,
    platform: layout.platform,
    runtime: layout.runtime.clone(),
    name,
  }
}
