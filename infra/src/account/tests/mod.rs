mod http_account_service_tests;
