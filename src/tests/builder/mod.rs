//! MultiseekBuilder tests.
