mod property_escape;
