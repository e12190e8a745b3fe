mod challenge_tests;
