mod accounts;
mod boosters;
mod catalog;
mod helpers;
mod mocks;
mod orders;
