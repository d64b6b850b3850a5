// Test modules for PocketChat
// Engine and API client tests exercising whole subsystems end to end

mod sync_tests;
