use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::graph::LayoutError;

/// Which way ranks flow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
	/// Ranks go down the page.
	#[default]
	#[serde(rename = "TB", alias = "TD", alias = "top-to-bottom")]
	TopToBottom,
	/// Ranks go rightwards.
	#[serde(rename = "LR", alias = "left-to-right")]
	LeftToRight,
	/// Ranks go up the page.
	#[serde(rename = "BT", alias = "bottom-to-top")]
	BottomToTop,
	/// Ranks go leftwards.
	#[serde(rename = "RL", alias = "right-to-left")]
	RightToLeft,
}

impl Direction {
	/// All directions, in selector order.
	pub const ALL: [Direction; 4] = [
		Direction::TopToBottom,
		Direction::LeftToRight,
		Direction::BottomToTop,
		Direction::RightToLeft,
	];

	/// Rank axis is y.
	pub fn is_vertical(self) -> bool {
		matches!(self, Direction::TopToBottom | Direction::BottomToTop)
	}

	/// Short code (`TB`, `LR`, ...).
	pub fn as_str(self) -> &'static str {
		match self {
			Direction::TopToBottom => "TB",
			Direction::LeftToRight => "LR",
			Direction::BottomToTop => "BT",
			Direction::RightToLeft => "RL",
		}
	}
}

impl fmt::Display for Direction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Direction {
	type Err = LayoutError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"TB" | "TD" | "top-to-bottom" => Ok(Direction::TopToBottom),
			"LR" | "left-to-right" => Ok(Direction::LeftToRight),
			"BT" | "bottom-to-top" => Ok(Direction::BottomToTop),
			"RL" | "right-to-left" => Ok(Direction::RightToLeft),
			other => Err(LayoutError::InvalidConfiguration(format!(
				"unknown direction {:?}",
				other
			))),
		}
	}
}

/// Layout knobs. Every field is optional in JSON.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutOptions {
	/// Rank flow direction.
	pub direction: Direction,
	/// Gap between neighbours in the same rank.
	pub node_spacing: f64,
	/// Gap between consecutive ranks.
	pub rank_spacing: f64,
}

impl Default for LayoutOptions {
	fn default() -> Self {
		Self {
			direction: Direction::TopToBottom,
			node_spacing: 50.0,
			rank_spacing: 80.0,
		}
	}
}

impl LayoutOptions {
	/// Parse an options object such as `{"direction": "LR"}`.
	pub fn from_json(json: &str) -> Result<Self, LayoutError> {
		let options: Self = serde_json::from_str(json)
			.map_err(|e| LayoutError::InvalidConfiguration(e.to_string()))?;
		options.validate()?;
		Ok(options)
	}

	/// Spacing must be finite and strictly positive.
	pub fn validate(&self) -> Result<(), LayoutError> {
		for (name, value) in [
			("nodeSpacing", self.node_spacing),
			("rankSpacing", self.rank_spacing),
		] {
			if !value.is_finite() || value <= 0.0 {
				return Err(LayoutError::InvalidConfiguration(format!(
					"{} must be a positive number, got {}",
					name, value
				)));
			}
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_fill_missing_fields() {
		let options = LayoutOptions::from_json(r#"{"direction": "LR"}"#).unwrap();
		assert_eq!(options.direction, Direction::LeftToRight);
		assert_eq!(options.node_spacing, 50.0);
		assert_eq!(options.rank_spacing, 80.0);
		assert_eq!(LayoutOptions::from_json("{}").unwrap(), LayoutOptions::default());
	}

	#[test]
	fn long_direction_names() {
		let options = LayoutOptions::from_json(r#"{"direction": "bottom-to-top"}"#).unwrap();
		assert_eq!(options.direction, Direction::BottomToTop);
		assert_eq!("right-to-left".parse::<Direction>(), Ok(Direction::RightToLeft));
	}

	#[test]
	fn rejects_unknown_direction() {
		assert!(matches!(
			LayoutOptions::from_json(r#"{"direction": "diagonal"}"#),
			Err(LayoutError::InvalidConfiguration(_))
		));
		assert!(matches!(
			"sideways".parse::<Direction>(),
			Err(LayoutError::InvalidConfiguration(_))
		));
	}

	#[test]
	fn rejects_non_positive_spacing() {
		assert!(LayoutOptions::from_json(r#"{"nodeSpacing": 0}"#).is_err());
		assert!(LayoutOptions::from_json(r#"{"rankSpacing": -5}"#).is_err());
		let nan = LayoutOptions {
			node_spacing: f64::NAN,
			..LayoutOptions::default()
		};
		assert!(nan.validate().is_err());
	}
}
