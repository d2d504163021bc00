use std::{collections::BTreeMap, time::Instant};

use log::{debug, error, info};
use rand::Rng;

use super::{model::ModelDefinition, object::StaticObject, registry::InstanceRegistry};
use crate::{
    config::{ConfigDatabase, EditorSettings, UrlConfig},
    error::{Error, Result},
};

/// Every static definition in the config database, keyed by model identity.
#[derive(Debug, Default)]
pub struct ConfigIndex {
    models: BTreeMap<String, ModelDefinition>,
    issues: Vec<Error>,
}

impl ConfigIndex {
    /// Indexes every definition node in `db` and fills `registry` with the
    /// instances recorded under them.
    ///
    /// A definition that has no mesh, collides with an earlier model identity
    /// or carries a malformed instance record is skipped as a whole (it ends
    /// up in neither the index nor the registry) and reported through
    /// [`issues`](Self::issues); the remaining definitions still load.
    pub fn load<R: Rng>(
        db: &ConfigDatabase,
        settings: &EditorSettings,
        registry: &mut InstanceRegistry,
        rng: &mut R,
    ) -> Self {
        let start = Instant::now();
        let mut index = Self::default();
        let mut loaded = 0;

        for config in db.configs_of_type(&settings.static_tag) {
            match index.load_definition(config, settings, registry, rng) {
                Ok(count) => loaded += count,
                Err(e) => {
                    error!("{}", describe(&e));
                    index.issues.push(e);
                }
            }
        }

        info!(
            "Loaded {} static models with {} instances ({}ms)",
            index.models.len(),
            loaded,
            start.elapsed().as_millis()
        );
        index
    }

    fn load_definition<R: Rng>(
        &mut self,
        config: UrlConfig<'_>,
        settings: &EditorSettings,
        registry: &mut InstanceRegistry,
        rng: &mut R,
    ) -> Result<usize> {
        let url = config.url();
        let def = ModelDefinition::new(&url, config.config.get_value("mesh"))?;

        if let Some(existing) = self.models.get(&def.model_identity) {
            return Err(Error::DuplicateModel {
                model: def.model_identity,
                url,
                existing: existing.config_identity.clone(),
            });
        }

        let instances = config
            .config
            .get_nodes(&settings.instances_tag)
            .enumerate()
            .map(|(index, record)| {
                StaticObject::from_record(record, &def.model_identity, &url)
                    .map_err(|source| Error::InvalidInstance {
                        url: url.clone(),
                        index,
                        source,
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        registry.ensure_model(&def.model_identity, &url)?;
        let count = instances.len();
        for instance in instances {
            registry.insert(instance, rng)?;
        }

        debug!("Model {} <- {} ({} instances)", def.model_identity, url, count);
        self.models.insert(def.model_identity.clone(), def);
        Ok(count)
    }

    pub fn get(&self, model_identity: &str) -> Option<&ModelDefinition> {
        self.models.get(model_identity)
    }

    /// The definition url owning `model_identity`
    pub fn config_identity(&self, model_identity: &str) -> Option<&str> {
        self.models
            .get(model_identity)
            .map(|d| d.config_identity.as_str())
    }

    /// Definitions in model identity order
    pub fn models(&self) -> impl Iterator<Item = &ModelDefinition> {
        self.models.values()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Definitions skipped while loading, with the reason
    pub fn issues(&self) -> &[Error] {
        &self.issues
    }
}

fn describe(e: &Error) -> String {
    match std::error::Error::source(e) {
        Some(source) => format!("{}: {}", e, source),
        None => e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn load(db: &ConfigDatabase) -> (ConfigIndex, InstanceRegistry) {
        let mut registry = InstanceRegistry::new();
        let mut rng = StdRng::seed_from_u64(0);
        let index = ConfigIndex::load(db, &EditorSettings::default(), &mut registry, &mut rng);
        (index, registry)
    }

    const INSTANCE: &str = "
    Instances
    {
        RadialPosition = 1,2,3
        RotationAngle = 10
        RadiusOffset = 0.5
        Orientation = 0,1,0
        VisibilityRange = 1000
        CelestialBody = Kerbin
    }
";

    fn definition(mesh: &str, instances: usize) -> String {
        format!("STATIC\n{{\n    mesh = {}\n    name = thing\n{}}}\n", mesh, INSTANCE.repeat(instances))
    }

    #[test]
    fn test_two_definitions_scenario() {
        let mut db = ConfigDatabase::new("GameData");
        db.insert_file("Town/Hangar/hangar", &definition("hangar.mu", 3)).unwrap();
        db.insert_file("Town/Tower/tower", &definition("tower.mu", 0)).unwrap();

        let (index, registry) = load(&db);
        assert_eq!(index.len(), 2);
        assert!(index.issues().is_empty());

        assert_eq!(registry.model_count(), 2);
        assert_eq!(registry.instances("Town/Hangar/hangar").len(), 3);
        assert_eq!(registry.instances("Town/Tower/tower").len(), 0);
        assert_eq!(
            index.config_identity("Town/Tower/tower"),
            Some("Town/Tower/tower/STATIC")
        );

        for obj in registry.instances("Town/Hangar/hangar") {
            assert_eq!(obj.model_identity, "Town/Hangar/hangar");
            assert_eq!(obj.config_identity, "Town/Hangar/hangar/STATIC");
            assert_eq!(obj.body_name, "Kerbin");
        }
    }

    #[test]
    fn test_missing_mesh_skips_only_that_definition() {
        let mut db = ConfigDatabase::new("GameData");
        db.insert_file("Town/Broken/broken", "STATIC\n{\n    name = nomesh\n}\n").unwrap();
        db.insert_file("Town/Tower/tower", &definition("tower.mu", 1)).unwrap();

        let (index, registry) = load(&db);
        assert_eq!(index.len(), 1);
        assert!(matches!(index.issues(), [Error::MissingMesh { .. }]));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_malformed_record_skips_definition() {
        let bad = definition("hangar.mu", 2).replace("RotationAngle = 10", "RotationAngle = ten");
        let mut db = ConfigDatabase::new("GameData");
        db.insert_file("Town/Hangar/hangar", &bad).unwrap();
        db.insert_file("Town/Tower/tower", &definition("tower.mu", 2)).unwrap();

        let (index, registry) = load(&db);
        assert!(index.get("Town/Hangar/hangar").is_none());
        assert!(!registry.contains_model("Town/Hangar/hangar"));
        assert!(matches!(
            index.issues(),
            [Error::InvalidInstance { index: 0, .. }]
        ));
        assert_eq!(registry.instances("Town/Tower/tower").len(), 2);
    }

    #[test]
    fn test_identity_collisions_are_detected() {
        let mut db = ConfigDatabase::new("GameData");
        // same directory, same mesh
        db.insert_file("Town/Hangar/a", &definition("hangar.mu", 1)).unwrap();
        db.insert_file("Town/Hangar/b", &definition("hangar.mu", 1)).unwrap();
        // `Town/Hangar` + `x/y.mu` against `Town/Hangar/x` + `y.mu`
        db.insert_file("Town/Hangar/c", &definition("x/y.mu", 0)).unwrap();
        db.insert_file("Town/Hangar/x/d", &definition("y.mu", 0)).unwrap();
        // same mesh name in different directories is fine
        db.insert_file("Town/Tower/t", &definition("hangar.mu", 0)).unwrap();

        let (index, registry) = load(&db);
        let identities: Vec<&str> = index.models().map(|d| d.model_identity.as_str()).collect();
        assert_eq!(
            identities,
            vec!["Town/Hangar/hangar", "Town/Hangar/x/y", "Town/Tower/hangar"]
        );
        assert_eq!(index.issues().len(), 2);
        assert!(index
            .issues()
            .iter()
            .all(|e| matches!(e, Error::DuplicateModel { .. })));

        assert_eq!(
            index.config_identity("Town/Hangar/hangar"),
            Some("Town/Hangar/a/STATIC")
        );
        assert_eq!(registry.instances("Town/Hangar/hangar").len(), 1);
    }
}
