//! Query module - the card/row model of an advanced search

mod row;
mod card;
mod expression;
pub mod validator;
pub mod view;

pub use row::{Row, SavedCard, SavedRow, DEFAULT_MULTI_SIZE};
pub use card::Card;
pub use expression::{SearchExpression, FIRST_CARD_INDEX};
pub use validator::{normalize_bool, validate, validate_row, ValidationReport};
pub use view::{render_expression, render_text, CardView, RowView};
