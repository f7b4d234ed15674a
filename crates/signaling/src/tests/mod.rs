//! Integrationstests fuer das Signal-Relay
