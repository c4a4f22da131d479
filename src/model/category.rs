//! The fixed set of transaction categories.

use serde::{Deserialize, Serialize};

/// Identifies one of the known categories. The declaration order is the display order used by
/// summaries and charts.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryId {
    Seeds,
    Fertilizer,
    Equipment,
    Labor,
    Sales,
    Other,
}

serde_plain::derive_display_from_serialize!(CategoryId);
serde_plain::derive_fromstr_from_deserialize!(CategoryId);

impl CategoryId {
    /// Every category, in display order.
    pub const ALL: [CategoryId; 6] = [
        CategoryId::Seeds,
        CategoryId::Fertilizer,
        CategoryId::Equipment,
        CategoryId::Labor,
        CategoryId::Sales,
        CategoryId::Other,
    ];

    /// Resolves a stored category id. Anything unrecognized is `Other`.
    pub fn lookup(id: &str) -> CategoryId {
        id.parse().unwrap_or(CategoryId::Other)
    }

    /// Position of this category in `ALL`.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn category(self) -> &'static Category {
        &CATEGORIES[self.index()]
    }

    pub fn name(self) -> &'static str {
        self.category().name
    }

    pub fn icon(self) -> &'static str {
        self.category().icon
    }
}

/// Static reference data for a category: display name and icon tag.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: &'static str,
    pub icon: &'static str,
}

/// The categories a transaction can be filed under, in display order.
pub const CATEGORIES: [Category; 6] = [
    Category {
        id: CategoryId::Seeds,
        name: "Sementes",
        icon: "bi-flower1",
    },
    Category {
        id: CategoryId::Fertilizer,
        name: "Fertilizantes",
        icon: "bi-droplet-fill",
    },
    Category {
        id: CategoryId::Equipment,
        name: "Equipamentos",
        icon: "bi-tools",
    },
    Category {
        id: CategoryId::Labor,
        name: "Mão de obra",
        icon: "bi-person-workspace",
    },
    Category {
        id: CategoryId::Sales,
        name: "Vendas",
        icon: "bi-cart-check",
    },
    Category {
        id: CategoryId::Other,
        name: "Outros",
        icon: "bi-three-dots",
    },
];
