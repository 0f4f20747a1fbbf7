mod console_sms_tests;
