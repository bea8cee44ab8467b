// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::AggregationMethod;

/// Parameters known without any manifest declaration: (name, method, unit, description).
pub const BUILTIN_PARAMETERS: &[(&str, AggregationMethod, &str, &str)] = &[
    ("timestamp", AggregationMethod::None, "RFC3339", "time of occurrence of the observation"),
    ("duration", AggregationMethod::Sum, "seconds", "length of the observation window"),
    ("carbon", AggregationMethod::Sum, "gCO2eq", "total carbon emitted"),
    ("carbon-operational", AggregationMethod::Sum, "gCO2eq", "operational carbon"),
    ("carbon-embodied", AggregationMethod::Sum, "gCO2eq", "embodied carbon allocated to the window"),
    ("energy", AggregationMethod::Sum, "kWh", "total energy consumed"),
    ("cpu/energy", AggregationMethod::Sum, "kWh", "energy consumed by the CPU"),
    ("memory/energy", AggregationMethod::Sum, "kWh", "energy consumed by memory"),
    ("cpu/utilization", AggregationMethod::Avg, "percentage", "CPU utilization"),
    ("cpu-util", AggregationMethod::Avg, "percentage", "CPU utilization"),
    ("memory/utilization", AggregationMethod::Avg, "percentage", "memory utilization"),
    ("time-reserved", AggregationMethod::Avg, "seconds", "time the resource was reserved"),
    ("cloud/instance-type", AggregationMethod::Copy, "none", "cloud instance type"),
    ("cloud/region", AggregationMethod::Copy, "none", "cloud region"),
    ("location", AggregationMethod::Copy, "none", "geographic location"),
];
