mod configuration;
mod ledger;
mod local_storage;
