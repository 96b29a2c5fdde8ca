//! Location records announced to reviewers.

use serde::{Deserialize, Serialize};

/// Organisation attached to a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partner {
    /// Display name.
    pub name: String,
}

/// A newly created location awaiting review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Display name.
    pub name: String,
    /// Kind of location, for example a pharmacy or a hospital.
    pub kind: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Postal address.
    pub address: String,
    /// Partners who created or manage the location, in creation order.
    #[serde(default)]
    pub partners: Vec<Partner>,
}

impl Location {
    /// Who created the location, as shown in announcements.
    ///
    /// Locations without partners were created by an administrator.
    ///
    /// # Examples
    /// ```
    /// use reach_notify::{Location, Partner};
    ///
    /// let mut location = Location {
    ///     name: "Centre".into(),
    ///     kind: "Hospital".into(),
    ///     description: String::new(),
    ///     address: "Paris".into(),
    ///     partners: Vec::new(),
    /// };
    /// assert_eq!(location.creator(), "an admin");
    /// location.partners.push(Partner { name: "Doctolib".into() });
    /// assert_eq!(location.creator(), "Doctolib");
    /// ```
    #[must_use]
    pub fn creator(&self) -> &str {
        self.partners
            .first()
            .map_or("an admin", |partner| partner.name.as_str())
    }
}
