//! Exclusive button groups that show or hide cards by name.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::aggregate::{count_by, sum_by};
use crate::format::{format_grouped_integer, format_revenue, round_half_up};
use crate::record::SalesRecord;

/// Category button that shows every card.
pub const WILDCARD: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    Category,
    Region,
}

impl GroupKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Region => "region",
        }
    }

    fn has_wildcard(self) -> bool {
        matches!(self, Self::Category)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToggleError {
    #[error("{group} button group has no buttons")]
    EmptyGroup { group: &'static str },
    #[error("no button named {name:?} in the {group} button group")]
    UnknownButton { group: &'static str, name: String },
}

/// One exclusive button group. Exactly one button is active at any time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ButtonGroup {
    kind: GroupKind,
    buttons: Vec<String>,
    active: usize,
}

impl ButtonGroup {
    pub fn new(kind: GroupKind, buttons: Vec<String>, initial: &str) -> Result<Self, ToggleError> {
        if buttons.is_empty() {
            return Err(ToggleError::EmptyGroup {
                group: kind.as_str(),
            });
        }
        let active = position(kind, &buttons, initial)?;
        Ok(Self {
            kind,
            buttons,
            active,
        })
    }

    pub fn kind(&self) -> GroupKind {
        self.kind
    }

    pub fn buttons(&self) -> &[String] {
        &self.buttons
    }

    pub fn active(&self) -> &str {
        &self.buttons[self.active]
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.active() == name
    }

    /// Moves the active marker to `name`. Unknown names leave the group untouched.
    pub fn select(&mut self, name: &str) -> Result<(), ToggleError> {
        self.active = position(self.kind, &self.buttons, name)?;
        Ok(())
    }

    pub fn is_visible(&self, card_name: &str) -> bool {
        let active = self.active();
        card_name == active || (self.kind.has_wildcard() && active == WILDCARD)
    }
}

fn position(kind: GroupKind, buttons: &[String], name: &str) -> Result<usize, ToggleError> {
    buttons
        .iter()
        .position(|button| button == name)
        .ok_or_else(|| ToggleError::UnknownButton {
            group: kind.as_str(),
            name: name.to_string(),
        })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Card {
    pub name: String,
    pub title: String,
    pub lines: Vec<String>,
}

/// Category cards and per-region insight cards, built from the unfiltered dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CardDeck {
    pub category_cards: Vec<Card>,
    pub insight_cards: Vec<Card>,
}

impl CardDeck {
    pub fn from_records(records: &[SalesRecord]) -> Self {
        let orders = count_by(records, |r| &r.category);
        let sales = sum_by(records, |r| &r.category, |r| r.sales);
        let profit = sum_by(records, |r| &r.category, |r| r.profit);

        let category_cards = orders
            .iter()
            .map(|entry| Card {
                name: entry.key.clone(),
                title: entry.key.clone(),
                lines: vec![
                    format!("Orders: {}", format_grouped_integer(entry.value as i64)),
                    format!(
                        "Sales: {}",
                        format_revenue(sales.get(&entry.key).unwrap_or(0.0))
                    ),
                    format!(
                        "Profit: {}",
                        format_grouped_integer(round_half_up(
                            profit.get(&entry.key).unwrap_or(0.0)
                        ))
                    ),
                ],
            })
            .collect();

        let region_profit = sum_by(records, |r| &r.region, |r| r.profit);
        let insight_cards = region_profit
            .iter()
            .map(|entry| {
                let in_region: Vec<SalesRecord> = records
                    .iter()
                    .filter(|r| r.region == entry.key)
                    .cloned()
                    .collect();
                let by_sub = sum_by(&in_region, |r| &r.sub_category, |r| r.profit);
                let best = by_sub
                    .iter()
                    .fold(None::<(&str, f64)>, |best, item| match best {
                        Some((_, value)) if value >= item.value => best,
                        _ => Some((item.key.as_str(), item.value)),
                    })
                    .map(|(key, _)| key.to_string())
                    .unwrap_or_else(|| "-".to_string());

                Card {
                    name: entry.key.clone(),
                    title: format!("{} Region", entry.key),
                    lines: vec![
                        format!(
                            "Profit: {}",
                            format_grouped_integer(round_half_up(entry.value))
                        ),
                        format!("Orders: {}", in_region.len()),
                        format!("Most profitable sub-category: {best}"),
                    ],
                }
            })
            .collect();

        Self {
            category_cards,
            insight_cards,
        }
    }

    pub fn cards(&self, kind: GroupKind) -> &[Card] {
        match kind {
            GroupKind::Category => &self.category_cards,
            GroupKind::Region => &self.insight_cards,
        }
    }
}

/// Selected button of every group on the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToggleState {
    pub category: ButtonGroup,
    pub region: ButtonGroup,
}

impl ToggleState {
    /// Category starts on the wildcard; region starts on the alphabetically first region.
    pub fn for_deck(deck: &CardDeck) -> Result<Self, ToggleError> {
        let mut category_buttons = vec![WILDCARD.to_string()];
        category_buttons.extend(deck.category_cards.iter().map(|card| card.name.clone()));
        let region_buttons: Vec<String> =
            deck.insight_cards.iter().map(|card| card.name.clone()).collect();
        let first_region = region_buttons.iter().min().cloned().unwrap_or_default();

        Ok(Self {
            category: ButtonGroup::new(GroupKind::Category, category_buttons, WILDCARD)?,
            region: ButtonGroup::new(GroupKind::Region, region_buttons, &first_region)?,
        })
    }

    pub fn group(&self, kind: GroupKind) -> &ButtonGroup {
        match kind {
            GroupKind::Category => &self.category,
            GroupKind::Region => &self.region,
        }
    }

    pub fn select(&mut self, kind: GroupKind, name: &str) -> Result<(), ToggleError> {
        match kind {
            GroupKind::Category => self.category.select(name),
            GroupKind::Region => self.region.select(name),
        }
    }

    pub fn is_visible(&self, kind: GroupKind, card: &Card) -> bool {
        self.group(kind).is_visible(&card.name)
    }
}
