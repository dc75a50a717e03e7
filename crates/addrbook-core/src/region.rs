//! Administrative regions accepted in the `state` field.
//!
//! Names are used verbatim: they are both the selectable values in the
//! address form and the exact text transmitted in payloads.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown region: {0:?}")]
pub struct ParseRegionError(pub String);

/// One of the fixed administrative regions (states and union territories).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Region {
    AndamanAndNicobarIslands,
    AndhraPradesh,
    ArunachalPradesh,
    Assam,
    Bihar,
    Chandigarh,
    Chhattisgarh,
    DadraAndNagarHaveli,
    DamanAndDiu,
    Delhi,
    Goa,
    Gujarat,
    Haryana,
    HimachalPradesh,
    Jammu,
    Jharkhand,
    Karnataka,
    Kashmir,
    Kerala,
    Ladakh,
    Lakshadweep,
    MadhyaPradesh,
    Maharashtra,
    Manipur,
    Meghalaya,
    Mizoram,
    Nagaland,
    Odisha,
    Puducherry,
    Punjab,
    Rajasthan,
    Sikkim,
    TamilNadu,
    Telangana,
    Tripura,
    Uttarakhand,
    UttarPradesh,
    WestBengal,
}

impl Region {
    /// Every region, in the order the form lists them.
    pub const ALL: [Region; 38] = [
        Region::AndamanAndNicobarIslands,
        Region::AndhraPradesh,
        Region::ArunachalPradesh,
        Region::Assam,
        Region::Bihar,
        Region::Chandigarh,
        Region::Chhattisgarh,
        Region::DadraAndNagarHaveli,
        Region::DamanAndDiu,
        Region::Delhi,
        Region::Goa,
        Region::Gujarat,
        Region::Haryana,
        Region::HimachalPradesh,
        Region::Jammu,
        Region::Jharkhand,
        Region::Karnataka,
        Region::Kashmir,
        Region::Kerala,
        Region::Ladakh,
        Region::Lakshadweep,
        Region::MadhyaPradesh,
        Region::Maharashtra,
        Region::Manipur,
        Region::Meghalaya,
        Region::Mizoram,
        Region::Nagaland,
        Region::Odisha,
        Region::Puducherry,
        Region::Punjab,
        Region::Rajasthan,
        Region::Sikkim,
        Region::TamilNadu,
        Region::Telangana,
        Region::Tripura,
        Region::Uttarakhand,
        Region::UttarPradesh,
        Region::WestBengal,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Region::AndamanAndNicobarIslands => "Andaman and Nicobar Islands",
            Region::AndhraPradesh => "Andhra Pradesh",
            Region::ArunachalPradesh => "Arunachal Pradesh",
            Region::Assam => "Assam",
            Region::Bihar => "Bihar",
            Region::Chandigarh => "Chandigarh",
            Region::Chhattisgarh => "Chhattisgarh",
            Region::DadraAndNagarHaveli => "Dadra and Nagar Haveli",
            Region::DamanAndDiu => "Daman and Diu",
            Region::Delhi => "Delhi",
            Region::Goa => "Goa",
            Region::Gujarat => "Gujarat",
            Region::Haryana => "Haryana",
            Region::HimachalPradesh => "Himachal Pradesh",
            Region::Jammu => "Jammu",
            Region::Jharkhand => "Jharkhand",
            Region::Karnataka => "Karnataka",
            Region::Kashmir => "Kashmir",
            Region::Kerala => "Kerala",
            Region::Ladakh => "Ladakh",
            Region::Lakshadweep => "Lakshadweep",
            Region::MadhyaPradesh => "Madhya Pradesh",
            Region::Maharashtra => "Maharashtra",
            Region::Manipur => "Manipur",
            Region::Meghalaya => "Meghalaya",
            Region::Mizoram => "Mizoram",
            Region::Nagaland => "Nagaland",
            Region::Odisha => "Odisha",
            Region::Puducherry => "Puducherry",
            Region::Punjab => "Punjab",
            Region::Rajasthan => "Rajasthan",
            Region::Sikkim => "Sikkim",
            Region::TamilNadu => "Tamil Nadu",
            Region::Telangana => "Telangana",
            Region::Tripura => "Tripura",
            Region::Uttarakhand => "Uttarakhand",
            Region::UttarPradesh => "Uttar Pradesh",
            Region::WestBengal => "West Bengal",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exact, case-sensitive match against the verbatim region names.
impl FromStr for Region {
    type Err = ParseRegionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Region::ALL
            .iter()
            .copied()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| ParseRegionError(s.to_string()))
    }
}

impl Serialize for Region {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Region {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
