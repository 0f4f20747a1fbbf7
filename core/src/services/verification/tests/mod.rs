mod challenge_store_tests;
mod cooldown_tests;
mod gateway_tests;
mod mocks;
