use log::info;

use crate::data::osm::Way;
use crate::data::render::Category;
use crate::errors::Result;
use crate::etl::Etl;

const ETL_NAME: &str = "categorize";

#[derive(Debug, Clone, Copy)]
enum TagPredicate {
    HasKey(&'static str),
    Equals(&'static str, &'static str),
}

impl TagPredicate {
    fn matches(self, way: &Way) -> bool {
        match self {
            TagPredicate::HasKey(key) => way.tags.contains_key(key),
            TagPredicate::Equals(key, value) => way.tag(key) == Some(value),
        }
    }
}

/// Evaluated top to bottom; the first category with a matching predicate wins.
/// Ways matching nothing are `Other`.
const CATEGORY_RULES: &[(Category, &[TagPredicate])] = &[
    (Category::Highway, &[TagPredicate::HasKey("highway")]),
    (Category::Building, &[TagPredicate::HasKey("building")]),
    (
        Category::Park,
        &[
            TagPredicate::Equals("leisure", "park"),
            TagPredicate::Equals("landuse", "recreation_ground"),
            TagPredicate::Equals("landuse", "park"),
            TagPredicate::Equals("landuse", "grass"),
            TagPredicate::Equals("natural", "wood"),
            TagPredicate::Equals("natural", "tree_row"),
        ],
    ),
    (
        Category::Water,
        &[
            TagPredicate::Equals("natural", "water"),
            TagPredicate::HasKey("waterway"),
            TagPredicate::Equals("landuse", "water"),
            TagPredicate::Equals("amenity", "fountain"),
        ],
    ),
];

pub fn category_of(way: &Way) -> Category {
    CATEGORY_RULES
        .iter()
        .find(|(_, predicates)| predicates.iter().any(|p| p.matches(way)))
        .map(|(category, _)| *category)
        .unwrap_or(Category::Other)
}

/// Ways sorted into categories, stored as indices into the way list they were
/// built from. Each list keeps the original way order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorizedWays {
    indices: [Vec<usize>; 5],
}

impl CategorizedWays {
    pub fn indices(&self, category: Category) -> &[usize] {
        &self.indices[category.index()]
    }

    /// Ways of `category`. `ways` must be the slice this was built from.
    pub fn ways<'a>(&'a self, category: Category, ways: &'a [Way]) -> impl Iterator<Item = &'a Way> + 'a {
        self.indices(category).iter().filter_map(move |&idx| ways.get(idx))
    }

    pub fn count(&self, category: Category) -> usize {
        self.indices(category).len()
    }

    pub fn len(&self) -> usize {
        self.indices.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn categorize(ways: &[Way]) -> CategorizedWays {
    let mut categorized = CategorizedWays::default();
    for (idx, way) in ways.iter().enumerate() {
        categorized.indices[category_of(way).index()].push(idx);
    }
    categorized
}

pub struct CategorizeEtl;

impl CategorizeEtl {
    pub fn new() -> CategorizeEtl {
        CategorizeEtl
    }
}

impl Default for CategorizeEtl {
    fn default() -> Self {
        Self::new()
    }
}

impl Etl for CategorizeEtl {
    type Input<'a> = &'a [Way];
    type Output = CategorizedWays;

    fn etl_name(&self) -> &str {
        ETL_NAME
    }

    fn transform(&mut self, input: &[Way]) -> Result<CategorizedWays> {
        let categorized = categorize(input);
        info!(
            etl_name = ETL_NAME,
            water = categorized.count(Category::Water),
            park = categorized.count(Category::Park),
            building = categorized.count(Category::Building),
            highway = categorized.count(Category::Highway),
            other = categorized.count(Category::Other);
            "Categorized ways"
        );
        Ok(categorized)
    }
}
