//! Explicit identifier → factory map for hierarchies and mixing processes.
//!
//! A validated [`ModelConfig`] is resolved into a [`Model`] once, at
//! configuration time. Nothing is looked up by name while sampling.

use std::collections::BTreeMap;

use bmx_common::{Error, Result};
use bmx_config::validate::validate_model;
use bmx_config::{HierarchyConfig, MixingConfig, ModelConfig};
use tracing::debug;

use crate::hierarchy::{Hierarchy, LapNigHierarchy, NnigHierarchy};
use crate::logging::event_names;
use crate::mixing::{DirichletProcess, MixingProcess, PitmanYorProcess, StickBreaking};

/// Every hierarchy family the registry can build.
#[derive(Debug, Clone, PartialEq)]
pub enum HierarchyModel {
    NormalNig(NnigHierarchy),
    LaplaceNig(LapNigHierarchy),
}

impl HierarchyModel {
    pub fn name(&self) -> &'static str {
        match self {
            HierarchyModel::NormalNig(h) => h.name(),
            HierarchyModel::LaplaceNig(h) => h.name(),
        }
    }

    pub fn is_conjugate(&self) -> bool {
        matches!(self, HierarchyModel::NormalNig(_))
    }
}

/// A configured hierarchy plus mixing process, passed explicitly to the
/// engine.
#[derive(Debug)]
pub struct Model {
    pub hierarchy: HierarchyModel,
    pub mixing: Box<dyn MixingProcess>,
}

pub type HierarchyFactory = fn(&HierarchyConfig) -> Result<HierarchyModel>;
pub type MixingFactory = fn(&MixingConfig) -> Result<Box<dyn MixingProcess>>;

#[derive(Debug, Clone, Default)]
pub struct Registry {
    hierarchies: BTreeMap<&'static str, HierarchyFactory>,
    mixings: BTreeMap<&'static str, MixingFactory>,
}

impl Registry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in family.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_hierarchy("normal_nig", build_normal_nig);
        registry.register_hierarchy("laplace_nig", build_laplace_nig);
        registry.register_mixing("dirichlet", build_dirichlet);
        registry.register_mixing("pitman_yor", build_pitman_yor);
        registry.register_mixing("stick_breaking", build_stick_breaking);
        registry
    }

    /// Returns the replaced factory, if any.
    pub fn register_hierarchy(
        &mut self,
        name: &'static str,
        factory: HierarchyFactory,
    ) -> Option<HierarchyFactory> {
        self.hierarchies.insert(name, factory)
    }

    pub fn register_mixing(
        &mut self,
        name: &'static str,
        factory: MixingFactory,
    ) -> Option<MixingFactory> {
        self.mixings.insert(name, factory)
    }

    pub fn hierarchy_names(&self) -> Vec<&'static str> {
        self.hierarchies.keys().copied().collect()
    }

    pub fn mixing_names(&self) -> Vec<&'static str> {
        self.mixings.keys().copied().collect()
    }

    pub fn build_hierarchy(&self, config: &HierarchyConfig) -> Result<HierarchyModel> {
        let id = config.identifier();
        let factory = self
            .hierarchies
            .get(id)
            .ok_or_else(|| Error::Config(format!("no hierarchy registered as '{}'", id)))?;
        factory(config)
    }

    pub fn build_mixing(&self, config: &MixingConfig) -> Result<Box<dyn MixingProcess>> {
        let id = config.identifier();
        let factory = self
            .mixings
            .get(id)
            .ok_or_else(|| Error::Config(format!("no mixing process registered as '{}'", id)))?;
        factory(config)
    }

    /// Validate `config` and build both components.
    pub fn build(&self, config: &ModelConfig) -> Result<Model> {
        validate_model(config)?;
        let hierarchy = self.build_hierarchy(&config.hierarchy)?;
        let mixing = self.build_mixing(&config.mixing)?;
        debug!(
            event = event_names::MODEL_BUILT,
            hierarchy = hierarchy.name(),
            mixing = mixing.name(),
            conjugate = hierarchy.is_conjugate(),
            conditional = mixing.is_conditional(),
            "model built"
        );
        Ok(Model { hierarchy, mixing })
    }
}

fn mismatch(expected: &str, got: &str) -> Error {
    Error::Config(format!(
        "factory for '{}' received a '{}' configuration",
        expected, got
    ))
}

fn build_normal_nig(config: &HierarchyConfig) -> Result<HierarchyModel> {
    let HierarchyConfig::NormalNig { params, hyperprior } = config else {
        return Err(mismatch("normal_nig", config.identifier()));
    };
    let hierarchy = match (params, hyperprior) {
        (Some(p), Some(h)) => NnigHierarchy::with_hyperprior_from(*p, *h)?,
        (None, Some(h)) => NnigHierarchy::with_hyperprior(*h)?,
        (Some(p), None) => NnigHierarchy::new(*p)?,
        (None, None) => NnigHierarchy::default(),
    };
    Ok(HierarchyModel::NormalNig(hierarchy))
}

fn build_laplace_nig(config: &HierarchyConfig) -> Result<HierarchyModel> {
    let HierarchyConfig::LaplaceNig { params } = config else {
        return Err(mismatch("laplace_nig", config.identifier()));
    };
    let hierarchy = match params {
        Some(p) => LapNigHierarchy::new(*p)?,
        None => LapNigHierarchy::default(),
    };
    Ok(HierarchyModel::LaplaceNig(hierarchy))
}

fn build_dirichlet(config: &MixingConfig) -> Result<Box<dyn MixingProcess>> {
    let MixingConfig::Dirichlet {
        total_mass,
        total_mass_prior,
    } = config
    else {
        return Err(mismatch("dirichlet", config.identifier()));
    };
    let process = match (total_mass, total_mass_prior) {
        (Some(mass), None) => DirichletProcess::new(*mass)?,
        (None, Some(prior)) => DirichletProcess::with_mass_prior(*prior)?,
        _ => {
            return Err(Error::invalid_parameter(
                "total_mass",
                "exactly one of total_mass and total_mass_prior must be set",
            ))
        }
    };
    Ok(Box::new(process))
}

fn build_pitman_yor(config: &MixingConfig) -> Result<Box<dyn MixingProcess>> {
    let MixingConfig::PitmanYor { strength, discount } = config else {
        return Err(mismatch("pitman_yor", config.identifier()));
    };
    Ok(Box::new(PitmanYorProcess::new(*strength, *discount)?))
}

fn build_stick_breaking(config: &MixingConfig) -> Result<Box<dyn MixingProcess>> {
    let MixingConfig::StickBreaking {
        sticks,
        mc_iterations,
        mc_seed,
    } = config
    else {
        return Err(mismatch("stick_breaking", config.identifier()));
    };
    Ok(Box::new(StickBreaking::new(
        sticks.clone(),
        *mc_iterations,
        *mc_seed,
    )?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bmx_config::{BetaParams, LapNigParams};

    #[test]
    fn builtins_are_registered() {
        let registry = Registry::with_builtins();
        assert_eq!(registry.hierarchy_names(), vec!["laplace_nig", "normal_nig"]);
        assert_eq!(
            registry.mixing_names(),
            vec!["dirichlet", "pitman_yor", "stick_breaking"]
        );
    }

    #[test]
    fn builds_default_model() {
        let model = Registry::with_builtins()
            .build(&ModelConfig::default())
            .unwrap();
        assert_eq!(model.hierarchy.name(), "normal_nig");
        assert!(model.hierarchy.is_conjugate());
        assert_eq!(model.mixing.name(), "dirichlet");
        assert_eq!(model.mixing.state(), vec![1.0]);
    }

    #[test]
    fn builds_laplace_stick_breaking() {
        let config = ModelConfig {
            hierarchy: HierarchyConfig::LaplaceNig {
                params: Some(LapNigParams::default()),
            },
            mixing: MixingConfig::StickBreaking {
                sticks: vec![
                    BetaParams {
                        alpha: 1.0,
                        beta: 1.0
                    };
                    3
                ],
                mc_iterations: 50,
                mc_seed: 1,
            },
            ..ModelConfig::default()
        };
        let model = Registry::with_builtins().build(&config).unwrap();
        assert!(!model.hierarchy.is_conjugate());
        assert!(model.mixing.is_conditional());
    }

    #[test]
    fn unknown_identifier_is_config_error() {
        let registry = Registry::new();
        let err = registry.build(&ModelConfig::default()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn invalid_values_surface_field_names() {
        let config = ModelConfig {
            mixing: MixingConfig::PitmanYor {
                strength: 1.0,
                discount: 2.0,
            },
            ..ModelConfig::default()
        };
        match Registry::with_builtins().build(&config) {
            Err(Error::InvalidParameter { field, .. }) => assert_eq!(field, "mixing.discount"),
            other => panic!("expected invalid discount, got {:?}", other.map(|m| m.mixing.name())),
        }
    }

    #[test]
    fn mismatched_factory_is_rejected() {
        let mut registry = Registry::with_builtins();
        registry.register_hierarchy("normal_nig", build_laplace_nig);
        assert!(matches!(
            registry.build(&ModelConfig::default()),
            Err(Error::Config(_))
        ));
    }
}
