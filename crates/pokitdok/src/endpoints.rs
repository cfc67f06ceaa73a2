//! API endpoint table
//!
//! Every business endpoint the client knows about, with the HTTP verb and the
//! path (relative to the API base URL) used to reach it.

use reqwest::Method;
use std::fmt;
use std::str::FromStr;

/// How an endpoint is invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    /// GET with the parameters as a query string
    Get,
    /// POST with the parameters as a JSON body
    Post,
    /// Not available remotely; fails without any network traffic
    Unsupported,
    /// POSTed like [`EndpointKind::Post`], but the response is discarded and the
    /// call fails as unsupported
    PostThenUnsupported,
}

/// A PokitDok business endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Activities,
    CashPrices,
    Claims,
    ClaimsStatus,
    Deductible,
    Eligibility,
    Enrollment,
    Files,
    InsurancePrices,
    Payers,
    Providers,
}

impl Endpoint {
    /// All endpoints, in alphabetical order
    pub const ALL: [Endpoint; 11] = [
        Endpoint::Activities,
        Endpoint::CashPrices,
        Endpoint::Claims,
        Endpoint::ClaimsStatus,
        Endpoint::Deductible,
        Endpoint::Eligibility,
        Endpoint::Enrollment,
        Endpoint::Files,
        Endpoint::InsurancePrices,
        Endpoint::Payers,
        Endpoint::Providers,
    ];

    /// Snake-case name, matching the client method name
    pub fn name(self) -> &'static str {
        match self {
            Endpoint::Activities => "activities",
            Endpoint::CashPrices => "cash_prices",
            Endpoint::Claims => "claims",
            Endpoint::ClaimsStatus => "claims_status",
            Endpoint::Deductible => "deductible",
            Endpoint::Eligibility => "eligibility",
            Endpoint::Enrollment => "enrollment",
            Endpoint::Files => "files",
            Endpoint::InsurancePrices => "insurance_prices",
            Endpoint::Payers => "payers",
            Endpoint::Providers => "providers",
        }
    }

    pub fn kind(self) -> EndpointKind {
        match self {
            Endpoint::Activities
            | Endpoint::InsurancePrices
            | Endpoint::Payers
            | Endpoint::Providers => EndpointKind::Get,
            Endpoint::Eligibility | Endpoint::Enrollment | Endpoint::Files => EndpointKind::Post,
            Endpoint::CashPrices | Endpoint::Deductible => EndpointKind::Unsupported,
            Endpoint::Claims | Endpoint::ClaimsStatus => EndpointKind::PostThenUnsupported,
        }
    }

    /// Path relative to the API base URL, `None` for endpoints that are never called.
    ///
    /// The trailing slashes on the POST paths are significant to the server.
    pub fn path(self) -> Option<&'static str> {
        match self {
            Endpoint::Activities => Some("activities"),
            Endpoint::Claims => Some("claims/"),
            Endpoint::ClaimsStatus => Some("claims/status/"),
            Endpoint::Eligibility => Some("eligibility/"),
            Endpoint::Enrollment => Some("enrollment/"),
            Endpoint::Files => Some("files/"),
            Endpoint::InsurancePrices => Some("prices/insurance"),
            Endpoint::Payers => Some("payers"),
            Endpoint::Providers => Some("providers"),
            Endpoint::CashPrices | Endpoint::Deductible => None,
        }
    }

    /// HTTP method used on the wire, `None` for endpoints that are never called
    pub fn method(self) -> Option<Method> {
        match self.kind() {
            EndpointKind::Get => Some(Method::GET),
            EndpointKind::Post | EndpointKind::PostThenUnsupported => Some(Method::POST),
            EndpointKind::Unsupported => None,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Endpoint {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Endpoint::ALL
            .into_iter()
            .find(|endpoint| endpoint.name() == normalized)
            .ok_or_else(|| {
                let known: Vec<&str> = Endpoint::ALL.iter().map(|e| e.name()).collect();
                format!("Unknown endpoint '{}'. Expected one of: {}", s, known.join(", "))
            })
    }
}

/// Build the absolute URL for a path relative to the API base URL
pub fn endpoint_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
