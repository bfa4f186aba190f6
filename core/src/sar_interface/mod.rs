pub mod input;
pub mod result;

pub use input::{
    hours_between, DriftStartPoint, EffortAllocationInput, OperationType, SarHeader, SarInput,
    SarOperation, WeatherSample,
};
pub use result::{
    DatumCircle, DatumLineResult, DatumPointResult, DriftResult, EffortAllocationResult,
    ProjectedDatum, RapidResponseResult, ResidualDrift, SarOutcome, SearchBox, SimpleSarResult,
};
