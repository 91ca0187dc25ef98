//! Canonical vehicle record and its field registry

use evstar_core::{LogicalType, Value};

/// Canonical columns of the normalized table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Vin,
    EvType,
    CafvEligibility,
    ElectricRange,
    BaseMsrp,
    ModelYear,
    Make,
    Model,
    State,
    County,
    City,
    PostalCode,
    LegislativeDistrict,
    DolVehicleId,
    VehicleLocation,
    ElectricUtility,
    CensusTract,
    /// Derived by the geo extractor
    Latitude,
    /// Derived by the geo extractor
    Longitude,
}

/// Fields read from the extract, in source column order
pub const SOURCE_FIELDS: [Field; 17] = [
    Field::Vin,
    Field::County,
    Field::City,
    Field::State,
    Field::PostalCode,
    Field::ModelYear,
    Field::Make,
    Field::Model,
    Field::EvType,
    Field::CafvEligibility,
    Field::ElectricRange,
    Field::BaseMsrp,
    Field::LegislativeDistrict,
    Field::DolVehicleId,
    Field::VehicleLocation,
    Field::ElectricUtility,
    Field::CensusTract,
];

impl Field {
    /// Canonical snake_case column name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Vin => "vin",
            Self::EvType => "ev_type",
            Self::CafvEligibility => "cafv_eligibility",
            Self::ElectricRange => "electric_range",
            Self::BaseMsrp => "base_msrp",
            Self::ModelYear => "model_year",
            Self::Make => "make",
            Self::Model => "model",
            Self::State => "state",
            Self::County => "county",
            Self::City => "city",
            Self::PostalCode => "postal_code",
            Self::LegislativeDistrict => "legislative_district",
            Self::DolVehicleId => "dol_vehicle_id",
            Self::VehicleLocation => "vehicle_location",
            Self::ElectricUtility => "electric_utility",
            Self::CensusTract => "census_tract",
            Self::Latitude => "latitude",
            Self::Longitude => "longitude",
        }
    }

    /// Header in the source extract, `None` for derived fields
    pub fn source_header(&self) -> Option<&'static str> {
        let header = match self {
            Self::Vin => "VIN (1-10)",
            Self::EvType => "Electric Vehicle Type",
            Self::CafvEligibility => "Clean Alternative Fuel Vehicle (CAFV) Eligibility",
            Self::ElectricRange => "Electric Range",
            Self::BaseMsrp => "Base MSRP",
            Self::ModelYear => "Model Year",
            Self::Make => "Make",
            Self::Model => "Model",
            Self::State => "State",
            Self::County => "County",
            Self::City => "City",
            Self::PostalCode => "Postal Code",
            Self::LegislativeDistrict => "Legislative District",
            Self::DolVehicleId => "DOL Vehicle ID",
            Self::VehicleLocation => "Vehicle Location",
            Self::ElectricUtility => "Electric Utility",
            Self::CensusTract => "2020 Census Tract",
            Self::Latitude | Self::Longitude => return None,
        };
        Some(header)
    }

    /// Type of the column once normalized
    pub fn logical_type(&self) -> LogicalType {
        match self {
            Self::ModelYear => LogicalType::Int,
            Self::ElectricRange | Self::BaseMsrp | Self::Latitude | Self::Longitude => LogicalType::Float,
            _ => LogicalType::String,
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One normalized registration row
///
/// `latitude` and `longitude` stay `None` until the geo extractor runs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VehicleRecord {
    /// 1-indexed line in the source file, when known
    pub line: Option<u64>,

    pub vin: Option<String>,
    pub ev_type: Option<String>,
    pub cafv_eligibility: Option<String>,
    pub electric_range: Option<f64>,
    pub base_msrp: Option<f64>,
    pub model_year: i64,
    pub make: Option<String>,
    pub model: Option<String>,
    pub state: Option<String>,
    pub county: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub legislative_district: Option<String>,
    pub dol_vehicle_id: Option<String>,
    pub vehicle_location: Option<String>,
    pub electric_utility: Option<String>,
    pub census_tract: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl VehicleRecord {
    /// Read a field as a cell value
    pub fn value(&self, field: Field) -> Value {
        match field {
            Field::Vin => Value::text(self.vin.as_deref()),
            Field::EvType => Value::text(self.ev_type.as_deref()),
            Field::CafvEligibility => Value::text(self.cafv_eligibility.as_deref()),
            Field::ElectricRange => Value::float(self.electric_range),
            Field::BaseMsrp => Value::float(self.base_msrp),
            Field::ModelYear => Value::Int(self.model_year),
            Field::Make => Value::text(self.make.as_deref()),
            Field::Model => Value::text(self.model.as_deref()),
            Field::State => Value::text(self.state.as_deref()),
            Field::County => Value::text(self.county.as_deref()),
            Field::City => Value::text(self.city.as_deref()),
            Field::PostalCode => Value::text(self.postal_code.as_deref()),
            Field::LegislativeDistrict => Value::text(self.legislative_district.as_deref()),
            Field::DolVehicleId => Value::text(self.dol_vehicle_id.as_deref()),
            Field::VehicleLocation => Value::text(self.vehicle_location.as_deref()),
            Field::ElectricUtility => Value::text(self.electric_utility.as_deref()),
            Field::CensusTract => Value::text(self.census_tract.as_deref()),
            Field::Latitude => Value::float(self.latitude),
            Field::Longitude => Value::float(self.longitude),
        }
    }

    /// Mutable access to a float column, `None` for non-float fields
    pub fn numeric_mut(&mut self, field: Field) -> Option<&mut Option<f64>> {
        match field {
            Field::ElectricRange => Some(&mut self.electric_range),
            Field::BaseMsrp => Some(&mut self.base_msrp),
            Field::Latitude => Some(&mut self.latitude),
            Field::Longitude => Some(&mut self.longitude),
            _ => None,
        }
    }

    /// Read a float column, `None` when null or not a float field
    pub fn numeric(&self, field: Field) -> Option<f64> {
        self.value(field).as_float()
    }
}
