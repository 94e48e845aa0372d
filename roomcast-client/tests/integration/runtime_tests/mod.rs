mod test_connection_lifecycle;
mod test_late_joiner_mirror;
mod test_unreadable_server_lines;
