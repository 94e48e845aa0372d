mod test_late_joiner_snapshot;
mod test_peer_departure;
