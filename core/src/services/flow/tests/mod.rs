mod machine_tests;
