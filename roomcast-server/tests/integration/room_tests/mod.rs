mod test_arena_scenario;
mod test_concurrent_join;
