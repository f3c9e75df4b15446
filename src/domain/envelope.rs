//! Envelope planes: opaque surfaces (exposed or ground-coupled) and windows.
//!
//! [`Plane`] is a tagged type so a constructed plane always carries the
//! properties its kind needs. Loose input records ([`PlaneSpec`]) go through
//! `TryFrom`, which names the plane and the missing property on failure.

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::error::ConfigurationError;

/// Surface orientation. Tilt 0 = horizontal facing up, 90 = vertical.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Orientation {
    pub tilt_deg: f64,
    pub azimuth_deg: f64,
}

impl Orientation {
    pub fn new(tilt_deg: f64, azimuth_deg: f64) -> Self {
        Self {
            tilt_deg,
            azimuth_deg,
        }
    }

    pub fn horizontal() -> Self {
        Self::new(0.0, 0.0)
    }

    pub fn vertical(azimuth_deg: f64) -> Self {
        Self::new(90.0, azimuth_deg)
    }
}

/// Category a plane's transmission is reported under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SurfaceClass {
    Wall,
    Roof,
    Floor,
}

impl SurfaceClass {
    /// Class implied by tilt and boundary when the caller does not give one.
    pub fn infer(tilt_deg: f64, ground_coupled: bool) -> Self {
        let vertical = (45.0..=135.0).contains(&tilt_deg);
        match (ground_coupled, vertical) {
            (true, false) => SurfaceClass::Floor,
            (_, true) => SurfaceClass::Wall,
            (false, false) if tilt_deg < 45.0 => SurfaceClass::Roof,
            (false, false) => SurfaceClass::Floor,
        }
    }
}

/// Thermal transmittance given either as U-value or as areal resistance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transmittance {
    /// W/m²K
    UValue(f64),
    /// m²K/W
    Resistance(f64),
}

impl Transmittance {
    pub fn u_value(&self) -> f64 {
        match *self {
            Transmittance::UValue(u) => u,
            Transmittance::Resistance(r) => 1.0 / r,
        }
    }

    fn raw(&self) -> (&'static str, f64) {
        match *self {
            Transmittance::UValue(u) => ("u_value", u),
            Transmittance::Resistance(r) => ("resistance", r),
        }
    }
}

/// Exterior boundary of an opaque plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "boundary", rename_all = "snake_case")]
pub enum Boundary {
    /// Driven by the sol-air temperature.
    Exposed { absorptance: f64, emissivity: f64 },
    /// Driven by the ground temperature column.
    GroundCoupled,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlaneKind {
    Opaque {
        transmittance: Transmittance,
        boundary: Boundary,
    },
    Window {
        transmittance: Transmittance,
        /// Solar heat-gain coefficient g
        solar_heat_gain: f64,
        shading_factor: f64,
    },
}

/// One envelope plane. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plane {
    id: String,
    area_m2: f64,
    orientation: Orientation,
    class: SurfaceClass,
    kind: PlaneKind,
}

impl Plane {
    pub fn new(
        id: impl Into<String>,
        area_m2: f64,
        orientation: Orientation,
        kind: PlaneKind,
    ) -> Result<Self, ConfigurationError> {
        let ground = matches!(
            kind,
            PlaneKind::Opaque {
                boundary: Boundary::GroundCoupled,
                ..
            }
        );
        let class = SurfaceClass::infer(orientation.tilt_deg, ground);
        Self::with_class(id, area_m2, orientation, class, kind)
    }

    pub fn with_class(
        id: impl Into<String>,
        area_m2: f64,
        orientation: Orientation,
        class: SurfaceClass,
        kind: PlaneKind,
    ) -> Result<Self, ConfigurationError> {
        let plane = Self {
            id: id.into(),
            area_m2,
            orientation,
            class,
            kind,
        };
        plane.validate()?;
        Ok(plane)
    }

    /// Exposed opaque plane from a U-value.
    pub fn opaque(
        id: impl Into<String>,
        area_m2: f64,
        orientation: Orientation,
        u_value: f64,
        absorptance: f64,
        emissivity: f64,
    ) -> Result<Self, ConfigurationError> {
        Self::new(
            id,
            area_m2,
            orientation,
            PlaneKind::Opaque {
                transmittance: Transmittance::UValue(u_value),
                boundary: Boundary::Exposed {
                    absorptance,
                    emissivity,
                },
            },
        )
    }

    pub fn ground_coupled(
        id: impl Into<String>,
        area_m2: f64,
        orientation: Orientation,
        u_value: f64,
    ) -> Result<Self, ConfigurationError> {
        Self::new(
            id,
            area_m2,
            orientation,
            PlaneKind::Opaque {
                transmittance: Transmittance::UValue(u_value),
                boundary: Boundary::GroundCoupled,
            },
        )
    }

    pub fn window(
        id: impl Into<String>,
        area_m2: f64,
        orientation: Orientation,
        u_value: f64,
        solar_heat_gain: f64,
        shading_factor: f64,
    ) -> Result<Self, ConfigurationError> {
        Self::new(
            id,
            area_m2,
            orientation,
            PlaneKind::Window {
                transmittance: Transmittance::UValue(u_value),
                solar_heat_gain,
                shading_factor,
            },
        )
    }

    fn validate(&self) -> Result<(), ConfigurationError> {
        if !(self.area_m2 > 0.0) {
            return Err(ConfigurationError::non_positive(&self.id, "area_m2", self.area_m2));
        }
        let transmittance = match &self.kind {
            PlaneKind::Opaque { transmittance, .. } | PlaneKind::Window { transmittance, .. } => {
                transmittance
            }
        };
        let (name, value) = transmittance.raw();
        if !(value > 0.0) || !value.is_finite() {
            return Err(ConfigurationError::non_positive(&self.id, name, value));
        }

        match self.kind {
            PlaneKind::Opaque {
                boundary:
                    Boundary::Exposed {
                        absorptance,
                        emissivity,
                    },
                ..
            } => {
                check_fraction(&self.id, "absorptance", absorptance)?;
                check_fraction(&self.id, "emissivity", emissivity)?;
            }
            PlaneKind::Window {
                solar_heat_gain,
                shading_factor,
                ..
            } => {
                check_fraction(&self.id, "solar_heat_gain", solar_heat_gain)?;
                check_fraction(&self.id, "shading_factor", shading_factor)?;
            }
            PlaneKind::Opaque { .. } => {}
        }
        Ok(())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn area_m2(&self) -> f64 {
        self.area_m2
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn class(&self) -> SurfaceClass {
        self.class
    }

    pub fn kind(&self) -> &PlaneKind {
        &self.kind
    }

    pub fn is_window(&self) -> bool {
        matches!(self.kind, PlaneKind::Window { .. })
    }

    pub fn is_ground_coupled(&self) -> bool {
        matches!(
            self.kind,
            PlaneKind::Opaque {
                boundary: Boundary::GroundCoupled,
                ..
            }
        )
    }

    /// Whole-plane conductance U·A in W/K.
    pub fn conductance_w_k(&self) -> f64 {
        let transmittance = match &self.kind {
            PlaneKind::Opaque { transmittance, .. } | PlaneKind::Window { transmittance, .. } => {
                transmittance
            }
        };
        transmittance.u_value() * self.area_m2
    }
}

fn check_fraction(entity: &str, property: &str, value: f64) -> Result<(), ConfigurationError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigurationError::out_of_range(entity, property, value, 0.0, 1.0));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaneType {
    Opaque,
    Window,
}

/// Loose plane record as read from scenario files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaneSpec {
    pub id: String,
    #[serde(rename = "type")]
    pub plane_type: PlaneType,
    pub area_m2: f64,
    pub tilt_deg: f64,
    pub azimuth_deg: f64,
    #[serde(default)]
    pub u_value: Option<f64>,
    #[serde(default)]
    pub resistance: Option<f64>,
    #[serde(default)]
    pub absorptance: Option<f64>,
    #[serde(default)]
    pub emissivity: Option<f64>,
    #[serde(default)]
    pub solar_heat_gain: Option<f64>,
    #[serde(default)]
    pub shading_factor: Option<f64>,
    #[serde(default)]
    pub ground_coupled: bool,
    #[serde(default)]
    pub class: Option<SurfaceClass>,
}

impl TryFrom<PlaneSpec> for Plane {
    type Error = ConfigurationError;

    fn try_from(spec: PlaneSpec) -> Result<Self, Self::Error> {
        let transmittance = match (spec.u_value, spec.resistance) {
            (Some(u), _) => Transmittance::UValue(u),
            (None, Some(r)) => Transmittance::Resistance(r),
            (None, None) => return Err(ConfigurationError::missing(&spec.id, "u_value")),
        };

        let kind = match spec.plane_type {
            PlaneType::Opaque if spec.ground_coupled => PlaneKind::Opaque {
                transmittance,
                boundary: Boundary::GroundCoupled,
            },
            PlaneType::Opaque => PlaneKind::Opaque {
                transmittance,
                boundary: Boundary::Exposed {
                    absorptance: spec
                        .absorptance
                        .ok_or_else(|| ConfigurationError::missing(&spec.id, "absorptance"))?,
                    emissivity: spec
                        .emissivity
                        .ok_or_else(|| ConfigurationError::missing(&spec.id, "emissivity"))?,
                },
            },
            PlaneType::Window => PlaneKind::Window {
                transmittance,
                solar_heat_gain: spec
                    .solar_heat_gain
                    .ok_or_else(|| ConfigurationError::missing(&spec.id, "solar_heat_gain"))?,
                shading_factor: spec.shading_factor.unwrap_or(1.0),
            },
        };

        let orientation = Orientation::new(spec.tilt_deg, spec.azimuth_deg);
        match spec.class {
            Some(class) => Plane::with_class(spec.id, spec.area_m2, orientation, class, kind),
            None => Plane::new(spec.id, spec.area_m2, orientation, kind),
        }
    }
}

/// Rejects repeated ids across a set of surfaces.
pub(crate) fn ensure_unique_ids<'a>(ids: impl IntoIterator<Item = &'a str>) -> Result<(), ConfigurationError> {
    let mut seen = std::collections::HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(ConfigurationError::DuplicateId { id: id.to_string() });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn spec(plane_type: PlaneType) -> PlaneSpec {
        PlaneSpec {
            id: "Wall-S".into(),
            plane_type,
            area_m2: 10.0,
            tilt_deg: 90.0,
            azimuth_deg: 180.0,
            u_value: Some(0.3),
            resistance: None,
            absorptance: Some(0.6),
            emissivity: Some(0.9),
            solar_heat_gain: None,
            shading_factor: None,
            ground_coupled: false,
            class: None,
        }
    }

    #[rstest]
    #[case(0.0, false, SurfaceClass::Roof)]
    #[case(30.0, false, SurfaceClass::Roof)]
    #[case(90.0, false, SurfaceClass::Wall)]
    #[case(180.0, false, SurfaceClass::Floor)]
    #[case(0.0, true, SurfaceClass::Floor)]
    #[case(90.0, true, SurfaceClass::Wall)]
    fn test_class_inference(#[case] tilt: f64, #[case] ground: bool, #[case] expected: SurfaceClass) {
        assert_eq!(SurfaceClass::infer(tilt, ground), expected);
    }

    #[test]
    fn test_resistance_from_areal_value() {
        let mut s = spec(PlaneType::Opaque);
        s.u_value = None;
        s.resistance = Some(2.0);
        let plane = Plane::try_from(s).unwrap();
        assert!((plane.conductance_w_k() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_opaque_missing_absorptance() {
        let mut s = spec(PlaneType::Opaque);
        s.absorptance = None;
        assert_eq!(
            Plane::try_from(s),
            Err(ConfigurationError::MissingProperty {
                plane: "Wall-S".into(),
                property: "absorptance".into()
            })
        );
    }

    #[test]
    fn test_ground_coupled_needs_no_optics() {
        let mut s = spec(PlaneType::Opaque);
        s.absorptance = None;
        s.emissivity = None;
        s.ground_coupled = true;
        s.tilt_deg = 0.0;
        let plane = Plane::try_from(s).unwrap();
        assert!(plane.is_ground_coupled());
        assert_eq!(plane.class(), SurfaceClass::Floor);
    }

    #[test]
    fn test_window_needs_g_and_defaults_shading() {
        let s = spec(PlaneType::Window);
        assert_eq!(
            Plane::try_from(s.clone()),
            Err(ConfigurationError::missing("Wall-S", "solar_heat_gain"))
        );

        let mut s = s;
        s.solar_heat_gain = Some(0.5);
        let plane = Plane::try_from(s).unwrap();
        match plane.kind() {
            PlaneKind::Window { shading_factor, .. } => assert_eq!(*shading_factor, 1.0),
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn test_missing_transmittance() {
        let mut s = spec(PlaneType::Opaque);
        s.u_value = None;
        assert_eq!(
            Plane::try_from(s),
            Err(ConfigurationError::missing("Wall-S", "u_value"))
        );
    }

    #[test]
    fn test_non_positive_area_rejected() {
        let err = Plane::opaque("Roof", 0.0, Orientation::horizontal(), 0.2, 0.7, 0.9).unwrap_err();
        assert!(matches!(err, ConfigurationError::NonPositive { .. }));
    }

    #[test]
    fn test_duplicate_ids() {
        assert!(ensure_unique_ids(["a", "b"]).is_ok());
        assert_eq!(
            ensure_unique_ids(["a", "b", "a"]),
            Err(ConfigurationError::DuplicateId { id: "a".into() })
        );
    }
}
