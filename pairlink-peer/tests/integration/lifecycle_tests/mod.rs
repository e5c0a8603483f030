mod test_disconnect_during_offer;
mod test_ice_state_changes;
