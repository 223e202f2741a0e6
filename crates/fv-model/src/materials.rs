//! Material and tube-section properties.
//!
//! Pure value objects: constructors validate the physical constraints
//! and everything else is derived arithmetic. An element references one
//! [`BeamProperty`] (material + section pair) through the analysis
//! property table, which allows per-element overrides.

use crate::error::ModelError;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Linear elastic isotropic material.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Density (ρ) [kg/m³]
    pub density: f64,
    /// Young's modulus (E) [Pa]
    pub youngs_modulus: f64,
    /// Poisson's ratio (ν) [-]
    pub poissons_ratio: f64,
}

impl Material {
    /// Create a material, validating ρ > 0, E > 0 and ν ∈ (-1, 0.5).
    pub fn new(density: f64, youngs_modulus: f64, poissons_ratio: f64) -> Result<Self, ModelError> {
        if !(density.is_finite() && density > 0.0) {
            return Err(ModelError::InvalidParameter(format!(
                "density must be positive, got {density}"
            )));
        }
        if !(youngs_modulus.is_finite() && youngs_modulus > 0.0) {
            return Err(ModelError::InvalidParameter(format!(
                "Young's modulus must be positive, got {youngs_modulus}"
            )));
        }
        if !(poissons_ratio.is_finite() && poissons_ratio > -1.0 && poissons_ratio < 0.5) {
            return Err(ModelError::InvalidParameter(format!(
                "Poisson's ratio must lie in (-1, 0.5), got {poissons_ratio}"
            )));
        }
        Ok(Self {
            density,
            youngs_modulus,
            poissons_ratio,
        })
    }

    /// Shear modulus G = E / (2(1+ν)).
    pub fn shear_modulus(&self) -> f64 {
        self.youngs_modulus / (2.0 * (1.0 + self.poissons_ratio))
    }
}

/// Hollow circular (tube) cross-section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TubeSection {
    /// Outer diameter (D) [m]
    pub outer_diameter: f64,
    /// Wall thickness (t) [m]
    pub wall_thickness: f64,
}

impl TubeSection {
    /// Create a tube section, validating D > 0 and 0 < t < D/2.
    pub fn new(outer_diameter: f64, wall_thickness: f64) -> Result<Self, ModelError> {
        if !(outer_diameter.is_finite() && outer_diameter > 0.0) {
            return Err(ModelError::InvalidParameter(format!(
                "outer diameter must be positive, got {outer_diameter}"
            )));
        }
        if !(wall_thickness.is_finite()
            && wall_thickness > 0.0
            && wall_thickness < outer_diameter / 2.0)
        {
            return Err(ModelError::InvalidParameter(format!(
                "wall thickness must lie in (0, D/2), got {wall_thickness} for D = {outer_diameter}"
            )));
        }
        Ok(Self {
            outer_diameter,
            wall_thickness,
        })
    }

    fn inner_diameter(&self) -> f64 {
        self.outer_diameter - 2.0 * self.wall_thickness
    }

    /// Cross-sectional area A = π/4 · (D² − d²).
    pub fn area(&self) -> f64 {
        let d = self.inner_diameter();
        PI / 4.0 * (self.outer_diameter.powi(2) - d.powi(2))
    }

    /// Second moment of area about either transverse axis,
    /// Iy = Iz = π/64 · (D⁴ − d⁴).
    pub fn second_moment(&self) -> f64 {
        let d = self.inner_diameter();
        PI / 64.0 * (self.outer_diameter.powi(4) - d.powi(4))
    }

    /// Polar moment (torsional constant) J = π/32 · (D⁴ − d⁴).
    pub fn polar_moment(&self) -> f64 {
        let d = self.inner_diameter();
        PI / 32.0 * (self.outer_diameter.powi(4) - d.powi(4))
    }
}

/// Material + section pair referenced by elements.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeamProperty {
    pub material: Material,
    pub section: TubeSection,
}

impl BeamProperty {
    pub fn new(material: Material, section: TubeSection) -> Self {
        Self { material, section }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steel() -> Material {
        Material::new(7850.0, 200e9, 0.3).unwrap()
    }

    #[test]
    fn shear_modulus_from_e_and_nu() {
        let g = steel().shear_modulus();
        assert!((g - 200e9 / 2.6).abs() / g < 1e-12);
    }

    #[test]
    fn material_rejects_non_physical_constants() {
        assert!(Material::new(0.0, 200e9, 0.3).is_err());
        assert!(Material::new(-1.0, 200e9, 0.3).is_err());
        assert!(Material::new(7850.0, 0.0, 0.3).is_err());
        assert!(Material::new(7850.0, 200e9, 0.5).is_err());
        assert!(Material::new(7850.0, 200e9, -1.0).is_err());
        assert!(Material::new(7850.0, f64::NAN, 0.3).is_err());
    }

    #[test]
    fn tube_section_derived_constants_are_positive() {
        let section = TubeSection::new(0.1, 0.005).unwrap();
        assert!(section.area() > 0.0 && section.area().is_finite());
        assert!(section.second_moment() > 0.0 && section.second_moment().is_finite());
        assert!(section.polar_moment() > 0.0 && section.polar_moment().is_finite());
        // Thin-walled circle: J = 2I
        assert!((section.polar_moment() - 2.0 * section.second_moment()).abs() < 1e-12);
    }

    #[test]
    fn tube_section_area_matches_hollow_circle() {
        let section = TubeSection::new(0.1, 0.005).unwrap();
        let expected = PI / 4.0 * (0.1f64.powi(2) - 0.09f64.powi(2));
        assert!((section.area() - expected).abs() < 1e-15);
    }

    #[test]
    fn tube_section_rejects_bad_geometry() {
        assert!(TubeSection::new(0.0, 0.005).is_err());
        assert!(TubeSection::new(-0.1, 0.005).is_err());
        assert!(TubeSection::new(0.1, 0.0).is_err());
        // Wall meets or exceeds the radius: no hollow core left
        assert!(TubeSection::new(0.1, 0.05).is_err());
        assert!(TubeSection::new(0.1, 0.08).is_err());
    }
}
